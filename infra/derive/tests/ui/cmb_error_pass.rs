use cmb_derive::cmb_error;
use std::borrow::Cow;

#[cmb_error]
pub enum ReaderError {
    #[error("Payload decode failure{}: {source}", format_context(.context))]
    Decode {
        #[source]
        source: std::num::ParseIntError,
        context: Option<Cow<'static, str>>,
    },

    #[error("Reader rejected the command{}: {message}", format_context(.context))]
    Rejected { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Internal error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

fn parse_code(raw: &str) -> Result<u8, ReaderError> {
    let code = raw.parse::<u8>().context("Parsing symbology code")?;
    Ok(code)
}

#[deny(private_interfaces)]
mod settings {
    use cmb_derive::cmb_error;
    use std::borrow::Cow;

    #[cmb_error]
    pub(crate) enum SettingsError {
        #[error("Invalid setting{}: {message}", format_context(.context))]
        Invalid { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
    }

    pub(crate) fn check(value: &str) -> Result<(), SettingsError> {
        let rejected = Err(SettingsError::Invalid { message: value.to_owned().into(), context: None });
        if value.is_empty() { Ok(()) } else { rejected.context("log.level") }
    }
}

fn main() {
    let err = settings::check("chatty").unwrap_err();
    assert_eq!(err.to_string(), "Invalid setting (log.level): chatty");

    assert!(parse_code("7").is_ok());

    let err = parse_code("x").unwrap_err();
    assert!(err.to_string().starts_with("Payload decode failure (Parsing symbology code)"));

    let err: ReaderError = "boom".into();
    assert_eq!(err.to_string(), "Internal error: boom");

    let err: Result<(), ReaderError> =
        Err(ReaderError::Rejected { message: "NAK".into(), context: None });
    let err = err.context("SET SYMBOL.QR ON").unwrap_err();
    assert_eq!(err.to_string(), "Reader rejected the command (SET SYMBOL.QR ON): NAK");
}
