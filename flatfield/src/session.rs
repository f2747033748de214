//! Caller-side state for an interactive correction workflow.
//!
//! Keeps the pristine raw image plus the current dark, flat and corrected
//! images, so inputs can be swapped or regenerated and the correction re-run.
//! All arithmetic is delegated to the stateless [`correction`](crate::correction)
//! and [`synthetic`](crate::synthetic) functions. A failed operation leaves
//! every stored image untouched.

use std::path::{Path, PathBuf};

use crate::gray_image::io::{load_image, save_corrected, save_image};
use crate::{
    check_inputs, correct, generate_fields, CorrectedImage, Error, Image, InputKind, Result,
    SyntheticFieldConfig,
};

#[derive(Debug, Default)]
pub struct CorrectionSession {
    raw: Option<Image>,
    dark: Option<Image>,
    flat: Option<Image>,
    corrected: Option<CorrectedImage>,
}

impl CorrectionSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn raw(&self) -> Option<&Image> {
        self.raw.as_ref()
    }

    pub fn dark(&self) -> Option<&Image> {
        self.dark.as_ref()
    }

    pub fn flat(&self) -> Option<&Image> {
        self.flat.as_ref()
    }

    pub fn corrected(&self) -> Option<&CorrectedImage> {
        self.corrected.as_ref()
    }

    /// Replace the raw image. Drops any previous correction result.
    pub fn set_raw(&mut self, image: Image) {
        self.raw = Some(image);
        self.corrected = None;
    }

    pub fn set_dark(&mut self, image: Image) {
        self.dark = Some(image);
    }

    pub fn set_flat(&mut self, image: Image) {
        self.flat = Some(image);
    }

    pub fn load_raw<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        let image = load_image(path)?;
        self.set_raw(image);
        Ok(())
    }

    pub fn load_dark<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        let image = load_image(path)?;
        self.set_dark(image);
        Ok(())
    }

    pub fn load_flat<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        let image = load_image(path)?;
        self.set_flat(image);
        Ok(())
    }

    /// Derive dark and flat fields from the raw image, overwriting both.
    pub fn generate_fields(&mut self, config: &SyntheticFieldConfig) -> Result<()> {
        let raw = self.raw.as_ref().ok_or(Error::MissingInput(InputKind::Raw))?;
        let (dark, flat) = generate_fields(raw, config)?;
        self.dark = Some(dark);
        self.flat = Some(flat);
        Ok(())
    }

    /// Correct the raw image with the current dark and flat fields.
    pub fn correct(&mut self) -> Result<&CorrectedImage> {
        let (raw, dark, flat) =
            check_inputs(self.raw.as_ref(), self.dark.as_ref(), self.flat.as_ref())?;
        let corrected = correct(raw, dark, flat)?;
        Ok(self.corrected.insert(corrected))
    }

    /// Write the last correction result. Returns the path actually written.
    pub fn save_corrected<P: AsRef<Path>>(&self, path: P) -> Result<PathBuf> {
        let corrected = self
            .corrected
            .as_ref()
            .ok_or(Error::MissingInput(InputKind::Corrected))?;
        Ok(save_corrected(corrected, path)?)
    }

    /// Write the current dark or flat field as 8-bit grayscale.
    pub fn save_field<P: AsRef<Path>>(&self, kind: InputKind, path: P) -> Result<PathBuf> {
        let image = match kind {
            InputKind::Raw => self.raw.as_ref(),
            InputKind::Dark => self.dark.as_ref(),
            InputKind::Flat => self.flat.as_ref(),
            InputKind::Corrected => return self.save_corrected(path),
        };
        let image = image.ok_or(Error::MissingInput(kind))?;
        Ok(save_image(image, path)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::gradient_image;

    #[test]
    fn test_correct_requires_all_inputs() {
        let mut session = CorrectionSession::new();
        assert!(matches!(
            session.correct(),
            Err(Error::MissingInput(InputKind::Raw))
        ));

        session.set_raw(Image::new_filled(4, 4, 100.0));
        assert!(matches!(
            session.correct(),
            Err(Error::MissingInput(InputKind::Dark))
        ));

        session.set_dark(Image::new_filled(4, 4, 10.0));
        assert!(matches!(
            session.correct(),
            Err(Error::MissingInput(InputKind::Flat))
        ));
        assert!(session.corrected().is_none());
    }

    #[test]
    fn test_generate_requires_raw() {
        let mut session = CorrectionSession::new();
        assert!(matches!(
            session.generate_fields(&SyntheticFieldConfig::default()),
            Err(Error::MissingInput(InputKind::Raw))
        ));
        assert!(session.dark().is_none());
        assert!(session.flat().is_none());
    }

    #[test]
    fn test_generate_then_correct() {
        let mut session = CorrectionSession::new();
        session.set_raw(gradient_image(16, 12));
        session
            .generate_fields(&SyntheticFieldConfig::seeded(21))
            .unwrap();

        let dims = session.raw().unwrap().dimensions();
        assert_eq!(session.dark().unwrap().dimensions(), dims);
        assert_eq!(session.flat().unwrap().dimensions(), dims);

        let corrected = session.correct().unwrap();
        assert_eq!(corrected.dimensions(), dims);
        assert!(session.corrected().is_some());
    }

    #[test]
    fn test_regenerate_overwrites_fields_and_keeps_raw() {
        let mut session = CorrectionSession::new();
        let raw = gradient_image(8, 8);
        session.set_raw(raw.clone());

        session.generate_fields(&SyntheticFieldConfig::seeded(1)).unwrap();
        let first_flat = session.flat().unwrap().clone();
        session.generate_fields(&SyntheticFieldConfig::seeded(2)).unwrap();

        assert_ne!(session.flat().unwrap(), &first_flat);
        assert_eq!(session.raw().unwrap(), &raw);
    }

    #[test]
    fn test_mismatch_keeps_previous_result() {
        let mut session = CorrectionSession::new();
        session.set_raw(Image::new_filled(4, 4, 200.0));
        session.set_dark(Image::new_filled(4, 4, 50.0));
        session.set_flat(Image::new_filled(4, 4, 150.0));
        session.correct().unwrap();

        session.set_flat(Image::new_filled(5, 4, 150.0));
        assert!(matches!(
            session.correct(),
            Err(Error::DimensionMismatch { .. })
        ));
        assert!(session.corrected().is_some());
        assert!(session.dark().is_some());
    }

    #[test]
    fn test_new_raw_clears_corrected() {
        let mut session = CorrectionSession::new();
        session.set_raw(Image::new_filled(2, 2, 1.0));
        session.set_dark(Image::new_filled(2, 2, 0.0));
        session.set_flat(Image::new_filled(2, 2, 2.0));
        session.correct().unwrap();

        session.set_raw(Image::new_filled(2, 2, 3.0));
        assert!(session.corrected().is_none());
        assert!(session.dark().is_some());
    }

    #[test]
    fn test_save_without_correction_fails() {
        let dir = tempfile::tempdir().unwrap();
        let session = CorrectionSession::new();
        assert!(matches!(
            session.save_corrected(dir.path().join("c.png")),
            Err(Error::MissingInput(InputKind::Corrected))
        ));
        assert!(matches!(
            session.save_field(InputKind::Dark, dir.path().join("d.png")),
            Err(Error::MissingInput(InputKind::Dark))
        ));
    }

    #[test]
    fn test_file_workflow() {
        let dir = tempfile::tempdir().unwrap();
        let raw_path = dir.path().join("raw.png");
        save_image(&gradient_image(20, 10), &raw_path).unwrap();

        let mut session = CorrectionSession::new();
        session.load_raw(&raw_path).unwrap();
        session.generate_fields(&SyntheticFieldConfig::seeded(4)).unwrap();

        let dark_path = session
            .save_field(InputKind::Dark, dir.path().join("dark.png"))
            .unwrap();
        let flat_path = session
            .save_field(InputKind::Flat, dir.path().join("flat.png"))
            .unwrap();

        let mut reloaded = CorrectionSession::new();
        reloaded.load_raw(&raw_path).unwrap();
        reloaded.load_dark(&dark_path).unwrap();
        reloaded.load_flat(&flat_path).unwrap();
        reloaded.correct().unwrap();

        let out = reloaded.save_corrected(dir.path().join("corrected")).unwrap();
        assert_eq!(out, dir.path().join("corrected.png"));
        let saved = load_image(&out).unwrap();
        assert_eq!(saved.dimensions(), reloaded.raw().unwrap().dimensions());
    }

    #[test]
    fn test_load_failure_keeps_state() {
        let mut session = CorrectionSession::new();
        session.set_dark(Image::new_filled(2, 2, 5.0));

        let err = session.load_dark("/nonexistent/dark.png").unwrap_err();
        assert!(matches!(err, Error::Io(_)));
        assert_eq!(session.dark().unwrap().pixels(), &[5.0; 4]);
    }
}
