//! Calibration blob for simulated devices.
//!
//! Mirrors what a stereo depth camera reports: color and depth intrinsics,
//! the color → depth extrinsic transform, depth scale and stereo baseline.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use depth_session_core::SessionError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Intrinsics {
    pub width: u32,
    pub height: u32,
    pub ppx: f32,
    pub ppy: f32,
    pub fx: f32,
    pub fy: f32,
    pub model: String,
    pub coeffs: [f32; 5],
}

impl Intrinsics {
    /// Pinhole intrinsics centered on the image with no distortion.
    pub fn centered(width: u32, height: u32, focal: f32) -> Self {
        Self {
            width,
            height,
            ppx: width as f32 / 2.0,
            ppy: height as f32 / 2.0,
            fx: focal,
            fy: focal,
            model: "brown_conrady".into(),
            coeffs: [0.0; 5],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Extrinsics {
    /// Column-major 3x3 rotation.
    pub rotation: [f32; 9],
    /// Translation in meters.
    pub translation: [f32; 3],
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalibrationBlob {
    pub serial: String,
    pub color: Intrinsics,
    pub depth: Intrinsics,
    pub color_to_depth: Extrinsics,
    pub depth_scale: f32,
    pub stereo_baseline_mm: f32,
}

impl CalibrationBlob {
    /// Factory-like calibration for a simulated sensor.
    pub fn simulated(serial: &str, width: u32, height: u32) -> Self {
        Self {
            serial: serial.to_string(),
            color: Intrinsics::centered(width, height, 615.0),
            depth: Intrinsics::centered(width, height, 385.0),
            color_to_depth: Extrinsics {
                rotation: [1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0],
                translation: [-0.015, 0.0, 0.0],
            },
            depth_scale: 0.001,
            stereo_baseline_mm: 50.0,
        }
    }

    /// Write `calib_<serial>.json` into `dir` and return the file path and
    /// its SHA-256 checksum.
    pub fn save(&self, dir: &Path) -> Result<(PathBuf, String), SessionError> {
        fs::create_dir_all(dir)
            .map_err(|e| SessionError::Io(format!("failed to create calibration directory: {}", e)))?;
        let path = dir.join(format!("calib_{}.json", self.serial));
        let json = serde_json::to_vec_pretty(self)
            .map_err(|e| SessionError::Io(format!("failed to serialize calibration: {}", e)))?;
        fs::write(&path, &json)
            .map_err(|e| SessionError::Io(format!("failed to write calibration: {}", e)))?;

        let checksum = Sha256::digest(&json)
            .iter()
            .map(|b| format!("{:02x}", b))
            .collect::<String>();
        Ok((path, checksum))
    }

    pub fn load(path: &Path) -> Result<Self, SessionError> {
        let json = fs::read(path)
            .map_err(|e| SessionError::Io(format!("failed to read calibration: {}", e)))?;
        serde_json::from_slice(&json)
            .map_err(|e| SessionError::Io(format!("failed to parse calibration: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn save_and_load_calibration() {
        let dir = std::env::temp_dir().join(format!("depth_session_calib_{}", uuid::Uuid::new_v4()));
        let blob = CalibrationBlob::simulated("001", 64, 48);

        let (path, checksum) = blob.save(&dir).unwrap();
        assert!(path.ends_with("calib_001.json"));
        assert_eq!(checksum.len(), 64);

        let loaded = CalibrationBlob::load(&path).unwrap();
        assert_eq!(loaded, blob);
        assert_eq!(loaded.color.ppx, 32.0);

        let _ = fs::remove_dir_all(&dir);
    }
}
