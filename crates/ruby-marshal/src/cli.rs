//! Core logic behind the `marshal-unpack` binary.

use crate::decode_to_json;
use crate::encoding::TextEncoding;
use crate::error::MarshalError;

#[derive(Debug)]
pub enum CliError {
    Json(serde_json::Error),
    Marshal(MarshalError),
    Usage(String),
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::Json(e) => write!(f, "{e}"),
            CliError::Marshal(e) => write!(f, "{e}"),
            CliError::Usage(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for CliError {}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        CliError::Json(e)
    }
}

impl From<MarshalError> for CliError {
    fn from(e: MarshalError) -> Self {
        CliError::Marshal(e)
    }
}

/// Command-line settings for `marshal-unpack`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UnpackArgs {
    pub encoding: TextEncoding,
    pub pretty: bool,
}

impl UnpackArgs {
    /// Parses `--encoding NAME` and `--pretty`; `args` excludes the program name.
    pub fn parse<I, S>(args: I) -> Result<Self, CliError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut out = UnpackArgs::default();
        let mut args = args.into_iter();
        while let Some(arg) = args.next() {
            match arg.as_ref() {
                "--pretty" => out.pretty = true,
                "--encoding" | "-e" => {
                    let name = args
                        .next()
                        .ok_or_else(|| CliError::Usage("--encoding needs a value".into()))?;
                    out.encoding = name.as_ref().parse::<TextEncoding>()?;
                }
                other => return Err(CliError::Usage(format!("unknown argument: {other}"))),
            }
        }
        Ok(out)
    }
}

/// Decodes a marshal stream to JSON text. A stream too short to hold a
/// value yields `null`.
pub fn unpack(bytes: &[u8], args: &UnpackArgs) -> Result<String, CliError> {
    let json = decode_to_json(bytes, args.encoding)?;
    let text = if args.pretty {
        serde_json::to_string_pretty(&json)?
    } else {
        serde_json::to_string(&json)?
    };
    Ok(text)
}
