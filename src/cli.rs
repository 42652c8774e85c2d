// src/cli.rs

use std::path::PathBuf;

/// The pollers share one tiny CLI surface: an optional `-s` flag and an
/// optional output name that gets a `.csv` suffix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputArgs {
    pub special: bool,
    pub output: PathBuf,
}

impl OutputArgs {
    pub fn parse<I, S>(args: I, default_output: &str) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut args = args.into_iter().map(Into::into);
        let mut special = false;
        let mut output = default_output.to_string();
        if let Some(first) = args.next() {
            if first == "-s" {
                special = true;
                if let Some(name) = args.next() {
                    output = format!("{}.csv", name);
                }
            } else {
                output = format!("{}.csv", first);
            }
        }
        Self {
            special,
            output: PathBuf::from(output),
        }
    }

    /// Parse from the process arguments (program name skipped).
    pub fn from_env(default_output: &str) -> Self {
        Self::parse(std::env::args().skip(1), default_output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_args_keeps_the_default_output() {
        let args = OutputArgs::parse(Vec::<String>::new(), "tele_cac_global.csv");
        assert!(!args.special);
        assert_eq!(args.output, PathBuf::from("tele_cac_global.csv"));
    }

    #[test]
    fn bare_name_becomes_the_csv_output() {
        let args = OutputArgs::parse(["run42"], "default.csv");
        assert!(!args.special);
        assert_eq!(args.output, PathBuf::from("run42.csv"));
    }

    #[test]
    fn special_flag_with_name() {
        let args = OutputArgs::parse(["-s", "run42"], "default.csv");
        assert!(args.special);
        assert_eq!(args.output, PathBuf::from("run42.csv"));
    }

    #[test]
    fn special_flag_alone_keeps_the_default() {
        let args = OutputArgs::parse(["-s"], "default.csv");
        assert!(args.special);
        assert_eq!(args.output, PathBuf::from("default.csv"));
    }
}
