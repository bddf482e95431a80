//! Derive macros for repdb result records
//!
//! This crate provides the `FromRow` derive macro, which maps a stored
//! procedure result row onto a Rust struct.
//!
//! The macro is re-exported from the `repdb` crate, so users typically
//! don't need to depend on this crate directly.

use proc_macro::TokenStream;
use syn::{parse_macro_input, DeriveInput};

mod from_row;

/// Derive macro for mapping result rows to Rust structs.
///
/// This macro generates an implementation of the `FromRow` trait.
///
/// # Attributes
///
/// On the struct:
///
/// - `#[repdb(rename_all = "camelCase")]` - Derive column names from field
///   names (`camelCase`, `PascalCase`, `snake_case` or `SCREAMING_SNAKE_CASE`)
///
/// On a field:
///
/// - `#[repdb(rename = "column_name")]` - Use a different column name for this field
/// - `#[repdb(default)]` - Use `Default` when the column is missing or NULL
/// - `#[repdb(skip)]` - Skip this field when reading from the row
///
/// # Example
///
/// ```ignore
/// use repdb::FromRow;
///
/// #[derive(FromRow)]
/// #[repdb(rename_all = "camelCase")]
/// pub struct PlateStats {
///     pub total_transits: i64,
///     #[repdb(rename = "more6symbols")]
///     pub more_six: i64,
///     #[repdb(rename = "less6symbols")]
///     pub less_six: i64,
/// }
/// ```
#[proc_macro_derive(FromRow, attributes(repdb))]
pub fn derive_from_row(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    from_row::derive_from_row_impl(input)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}
