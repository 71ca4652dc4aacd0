//! Shared fixtures for integration tests

#![allow(dead_code)]

use inshight::types::Landmark;

/// Expression knobs for a synthetic 478-point mesh
#[derive(Debug, Clone, Copy)]
pub struct Face {
    /// Lid gap as a fraction of eye width
    pub openness: f64,
    /// Iris position inside the eye, 0..1 on each axis
    pub iris: (f64, f64),
    /// Mouth width over lip opening
    pub smile: f64,
    pub brow_gap: f64,
}

impl Default for Face {
    fn default() -> Self {
        Self {
            openness: 0.3,
            iris: (0.5, 0.5),
            smile: 2.0,
            brow_gap: 0.0,
        }
    }
}

impl Face {
    pub fn smiling() -> Self {
        Self { smile: 2.6, ..Self::default() }
    }

    pub fn frowning() -> Self {
        Self { smile: 1.2, ..Self::default() }
    }

    pub fn landmarks(&self) -> Vec<Landmark> {
        let mut lm = vec![Landmark::new(0.5, 0.5); 478];
        let half_lid = self.openness * 0.1 / 2.0;
        let (ih, iv) = self.iris;
        let iris_y = 0.40 - half_lid + iv * 2.0 * half_lid;

        // Left eye: outer 33, inner 133, top 159, bottom 145, iris 468..=472
        lm[33] = Landmark::new(0.30, 0.40);
        lm[133] = Landmark::new(0.40, 0.40);
        lm[159] = Landmark::new(0.35, 0.40 - half_lid);
        lm[145] = Landmark::new(0.35, 0.40 + half_lid);
        for i in 468..=472 {
            lm[i] = Landmark::new(0.30 + ih * 0.1, iris_y);
        }

        // Right eye: outer 263, inner 362, top 386, bottom 374, iris 473..=477
        lm[263] = Landmark::new(0.70, 0.40);
        lm[362] = Landmark::new(0.60, 0.40);
        lm[386] = Landmark::new(0.65, 0.40 - half_lid);
        lm[374] = Landmark::new(0.65, 0.40 + half_lid);
        for i in 473..=477 {
            lm[i] = Landmark::new(0.60 + ih * 0.1, iris_y);
        }

        // Mouth: corners 61/291, lips 13/14
        let width = 0.10;
        let open = width / self.smile;
        lm[61] = Landmark::new(0.5 - width / 2.0, 0.70);
        lm[291] = Landmark::new(0.5 + width / 2.0, 0.70);
        lm[13] = Landmark::new(0.5, 0.70 - open / 2.0);
        lm[14] = Landmark::new(0.5, 0.70 + open / 2.0);

        // Brows: top 107/336, inner 70/300
        lm[70] = Landmark::new(0.36, 0.30);
        lm[107] = Landmark::new(0.38, 0.30 - self.brow_gap);
        lm[300] = Landmark::new(0.64, 0.30);
        lm[336] = Landmark::new(0.62, 0.30 - self.brow_gap);
        lm
    }

    pub fn pairs(&self) -> Vec<[f64; 2]> {
        self.landmarks().iter().map(|l| [l.x, l.y]).collect()
    }
}
