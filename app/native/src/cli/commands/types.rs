//! Shared types for CLI commands.

use clap::ValueEnum;

use crate::config::RotationMode;

/// Rotation mode accepted on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ModeArg {
    /// One image stretched across every display.
    Span,
    /// The whole image on each display.
    Individual,
}

impl From<ModeArg> for RotationMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Span => Self::Span,
            ModeArg::Individual => Self::Individual,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_arg_maps_to_rotation_mode() {
        assert_eq!(RotationMode::from(ModeArg::Span), RotationMode::Span);
        assert_eq!(RotationMode::from(ModeArg::Individual), RotationMode::Individual);
    }

    #[test]
    fn test_mode_arg_parses_lowercase() {
        assert_eq!(ModeArg::from_str("individual", true).unwrap(), ModeArg::Individual);
        assert!(ModeArg::from_str("tile", true).is_err());
    }
}
