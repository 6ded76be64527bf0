use custom_error::custom_error;

pub type Result<T> = std::result::Result<T, Error>;

custom_error! {pub Error
    Io{source: std::io::Error} = "I/O error",
    Zip{source: zip::result::ZipError} = "zip archive error",
    NotYielded = "No item was yielded",
    XML{quick_xml: quick_xml::Error} = "XML error",
    InvalidCoordinate{lat: f64, lon: f64} = "invalid coordinate lat={lat} lon={lon}",
    Contract{function: String, detail: String} = "{function}(): {detail}"
}

impl From<quick_xml::Error> for Error {
    fn from(e: quick_xml::Error) -> Error {
        Error::XML { quick_xml: e }
    }
}

impl Error {
    /// A caller contract violation raised by the named script function.
    pub fn contract<F: Into<String>, D: Into<String>>(function: F, detail: D) -> Error {
        let (function, detail) = (function.into(), detail.into());
        tracing::debug!(%function, %detail, "rejecting call");
        Error::Contract { function, detail }
    }

    pub fn is_contract(&self) -> bool {
        match self {
            Error::Contract { .. } => true,
            _ => false,
        }
    }
}
