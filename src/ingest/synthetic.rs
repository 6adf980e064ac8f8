use anyhow::{anyhow, Result};

use crate::frame::Frame;

pub(crate) const SYNTHETIC_WIDTH: u32 = 320;
pub(crate) const SYNTHETIC_HEIGHT: u32 = 240;

/// Canned lighting conditions for `stub://` sources.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Scene {
    Night,
    Dusk,
    Golden,
    Day,
}

impl Scene {
    /// Order a stub camera walks through: a compressed day.
    pub(crate) const CYCLE: [Scene; 4] = [Scene::Night, Scene::Golden, Scene::Day, Scene::Dusk];

    pub fn parse(name: &str) -> Result<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "night" => Ok(Scene::Night),
            "dusk" => Ok(Scene::Dusk),
            "golden" | "morning" => Ok(Scene::Golden),
            "day" => Ok(Scene::Day),
            other => Err(anyhow!("unknown synthetic scene '{}'", other)),
        }
    }

    /// Base colour. Dusk stays under the default threshold.
    fn base_rgb(self) -> [u8; 3] {
        match self {
            Scene::Night => [12, 14, 28],
            Scene::Dusk => [70, 58, 82],
            Scene::Golden => [220, 150, 80],
            Scene::Day => [185, 200, 215],
        }
    }

    /// Render the scene with a mild vertical gradient so the histogram is
    /// not a single spike.
    pub fn render(self, width: u32, height: u32) -> Frame {
        let [r, g, b] = self.base_rgb();
        let mut data = Vec::with_capacity(width as usize * height as usize * 3);
        for y in 0..height {
            let shade = (y * 16 / height.max(1)) as u8;
            for _ in 0..width {
                data.push(r.saturating_add(shade));
                data.push(g.saturating_add(shade));
                data.push(b.saturating_add(shade));
            }
        }
        match Frame::from_rgb(data, width, height) {
            Ok(frame) => frame,
            Err(_) => Frame::filled(width, height, [r, g, b]),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::{classify, Prediction};

    #[test]
    fn scenes_classify_as_named() {
        let cases = [
            (Scene::Night, Prediction::Night),
            (Scene::Dusk, Prediction::Night),
            (Scene::Golden, Prediction::GoldenHour),
            (Scene::Day, Prediction::Day),
        ];
        for (scene, expected) in cases {
            let frame = scene.render(SYNTHETIC_WIDTH, SYNTHETIC_HEIGHT);
            assert_eq!(classify(&frame, 80.0).prediction, expected, "{:?}", scene);
        }
    }

    #[test]
    fn parse_rejects_unknown_scene() {
        assert_eq!(Scene::parse("Morning").unwrap(), Scene::Golden);
        assert!(Scene::parse("eclipse").is_err());
    }
}
