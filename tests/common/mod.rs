// Shared test helpers for integration tests
#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::{TempDir, tempdir};

/// Model spectrum as the simulation writes it: a header row, then
/// frequency (Hz), F_nu and an unused column. The rows sit at 4000 Å,
/// 8000 Å and 10000 Å; normalized at 8000 Å they read 2.0, 1.0 and 1.28.
pub const MODEL_SPECTRUM: &str = "nu F_nu n_photons\n7.5e14 0.5 0\n3.75e14 1.0 0\n3.0e14 2.0 0\n";

/// Baseline spectrum: wavelength (Å) and flux, no header.
pub const BASELINE_SPECTRUM: &str = "2000 1.5\n8000 1.0\n10000 2.0\n";

/// Shell script that stands in for the simulation: writes the model
/// spectrum and the scratch files the real code leaves behind.
pub const FAKE_SIMULATION: &str = "printf 'nu F_nu n_photons\\n7.5e14 0.5 0\\n3.75e14 1.0 0\\n3.0e14 2.0 0\\n' > spectrum_1.dat && touch out_spectrum_1.dat ray_1 ray_2 gomc && echo simulation done";

/// Creates a simulation directory holding only the baseline spectrum.
pub fn setup_simulation_dir() -> TempDir {
    let dir = tempdir().expect("Failed to create temporary directory");
    fs::write(dir.path().join("synow_spectrum.dat"), BASELINE_SPECTRUM).expect("Failed to write baseline");
    dir
}

/// Writes both spectra directly, for tests that do not launch a simulation.
pub fn write_spectra(dir: &Path) {
    fs::write(dir.join("spectrum_1.dat"), MODEL_SPECTRUM).expect("Failed to write model spectrum");
    fs::write(dir.join("synow_spectrum.dat"), BASELINE_SPECTRUM).expect("Failed to write baseline");
}

/// TOML `[[cases]]` entry running the fake simulation through `sh -c`.
pub fn fake_case(name: &str, directory: &Path, extra: &str) -> String {
    format!(
        "[[cases]]\nname = \"{name}\"\ndirectory = {directory:?}\nprogram = \"sh\"\nargs = [\"-c\", {script:?}]\ntimeout_secs = 30\n{extra}\n",
        directory = directory.display().to_string(),
        script = FAKE_SIMULATION,
    )
}

/// Writes a suite file into `dir` and returns its path.
pub fn write_suite(dir: &Path, body: &str) -> PathBuf {
    let path = dir.join("SpectrumSuite.toml");
    fs::write(&path, format!("language = \"en\"\n\n{body}")).expect("Failed to write suite");
    path
}

/// Helper function to create an invalid TOML configuration
pub fn create_invalid_toml(dir: &Path) -> PathBuf {
    let path = dir.join("invalid.toml");
    let content = r#"
language = "en"
# Invalid TOML - missing closing bracket
[[cases]
name = "invalid-case"
"#;
    fs::write(&path, content).expect("Failed to write invalid suite");
    path
}
