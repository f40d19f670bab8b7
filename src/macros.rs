/// Macro for skipping loop iterations that error
/// ```
/// # use release_email::macros::ok_or_continue;
/// // Fields that can't be read are skipped
/// let lines = ["1", "two", "3"];
///
/// let mut sum = 0;
/// for line in lines {
///     sum += ok_or_continue!(line.parse::<u32>());
/// }
///
/// assert_eq!(sum, 4);
/// ```
#[doc(hidden)] #[macro_export]
macro_rules! __ok_or_continue {
    ($res:expr) => {
        match $res {
            Ok(v) => v,
            Err(e) => {
                log::warn!("{:#}, skipped.", e);
                continue;
            },
        }
    };
}

/// Macro for skipping loop iterations that error
/// ```
/// # use release_email::macros::ok_or_continue;
/// let mut parsed = vec![];
/// for value in ["a", "1"] {
///     parsed.push(ok_or_continue!(value.parse::<u8>()));
/// }
/// assert_eq!(parsed, vec![1]);
/// ```
#[doc(inline)]
pub use crate::__ok_or_continue as ok_or_continue;
