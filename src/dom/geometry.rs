use serde::{Deserialize, Serialize};

/// On-screen box of an element, in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct BoundingBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl BoundingBox {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Parses `x,y,width,height` (commas and/or whitespace).
    pub fn parse(raw: &str) -> Option<Self> {
        let values: Vec<f64> = raw
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|s| !s.is_empty())
            .map(|s| s.parse().ok())
            .collect::<Option<_>>()?;
        match values.as_slice() {
            [x, y, width, height] => Some(Self::new(*x, *y, *width, *height)),
            _ => None,
        }
    }

    pub fn center(&self) -> (f64, f64) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Center-to-center distance with the vertical offset weighted 3x, since
    /// labels sit beside or just above their inputs.
    pub fn label_distance(&self, other: &BoundingBox) -> f64 {
        let (ax, ay) = self.center();
        let (bx, by) = other.center();
        let dx = ax - bx;
        let dy = (ay - by) * 3.0;
        (dx * dx + dy * dy).sqrt()
    }
}
