use thiserror::Error;

macro_rules! malformed_error {
    // Single string version
    ($msg:expr) => {
        crate::Error::Malformed {
            message: $msg.to_string(),
            file: file!(),
            line: line!(),
        }
    };

    // Format string with arguments version
    ($fmt:expr, $($arg:tt)*) => {
        crate::Error::Malformed {
            message: format!($fmt, $($arg)*),
            file: file!(),
            line: line!(),
        }
    };
}

/// The generic Error type, which provides coverage for all errors this library can potentially
/// return.
///
/// # Error Categories
///
/// ## Signature Resolution Errors
/// - [`Error::InvalidInput`] - A signature that cannot be resolved was handed in
/// - [`Error::RecursionLimit`] - The signature tree is nested deeper than allowed
/// - [`Error::NotSupported`] - The signature contains a construct the resolver refuses
/// - [`Error::Malformed`] - The signature tree or payload is structurally invalid
///
/// ## Constant Pool Errors
/// - [`Error::OutOfBounds`] - A constant id or record points outside the decoded buffer
/// - [`Error::TypeConversionInvalid`] - A constant was requested as the wrong kind of value
/// - [`Error::Decompression`] - The decrypted payload could not be decompressed
/// - [`Error::ConstantsUnavailable`] - The one-time initialization of the pool failed
///
/// # Examples
///
/// ```rust
/// use dotshield::{analysis::generics::resolve_type, metadata::signatures::TypeSignature, Error};
///
/// match resolve_type(&TypeSignature::Unknown, &[]) {
///     Err(Error::InvalidInput(message)) => eprintln!("rejected: {message}"),
///     Err(Error::RecursionLimit(max)) => eprintln!("nested deeper than {max}"),
///     Err(e) => eprintln!("other error: {e}"),
///     Ok(resolved) => println!("{resolved:?}"),
/// }
/// ```
#[derive(Error, Debug)]
pub enum Error {
    /// The input is damaged and could not be processed.
    ///
    /// The error includes the source location where the malformation was
    /// detected for debugging purposes.
    ///
    /// # Fields
    ///
    /// * `message` - Detailed description of what was malformed
    /// * `file` - Source file where the error was detected
    /// * `line` - Source line where the error was detected
    #[error("Malformed - {file}:{line}: {message}")]
    Malformed {
        /// The message to be printed for the Malformed error
        message: String,
        /// The source file in which this error occured
        file: &'static str,
        /// The source line in which this error occured
        line: u32,
    },

    /// An out of bound access was attempted while reading the constant pool.
    #[error("Out of Bound read would have occurred!")]
    OutOfBounds,

    /// The signature uses a construct that is not supported.
    ///
    /// Function pointer signatures are rejected by the generic resolver instead
    /// of being returned half-resolved.
    #[error("Not supported - {0}")]
    NotSupported(String),

    /// The value handed to a public entry point can not be processed at all.
    ///
    /// Raised before any work is performed, so no partial result exists.
    #[error("Invalid input - {0}")]
    InvalidInput(String),

    /// Recursion limit reached.
    ///
    /// To prevent stack overflow on pathological signature trees a maximum
    /// recursion depth is enforced. The associated value shows the limit that
    /// was reached.
    #[error("Reach the maximum recursion level allowed - {0}")]
    RecursionLimit(usize),

    /// The requested type conversion is not possible.
    ///
    /// Occurs when a constant id of one kind (string, scalar, array) is read as
    /// a value of another kind.
    #[error("The requested type conversion is not possible")]
    TypeConversionInvalid,

    /// The decrypted constant payload could not be decompressed.
    #[error("Decompression failed - {0}")]
    Decompression(#[from] crate::utils::DecompressError),

    /// The process-wide constant pool failed to initialize.
    ///
    /// Initialization runs exactly once; every later caller observes the same
    /// failure through this variant.
    #[error("Constant pool unavailable - {0}")]
    ConstantsUnavailable(String),
}
