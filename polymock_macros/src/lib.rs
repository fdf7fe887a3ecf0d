//! The polymock procedural macro.

#![forbid(unsafe_code)]

mod fake;

extern crate proc_macro;

///
/// Generate a fake implementation of a trait.
/// Re-exported by `polymock`, it is documented there.
///
#[proc_macro_attribute]
pub fn fake(
    attr: proc_macro::TokenStream,
    input: proc_macro::TokenStream,
) -> proc_macro::TokenStream {
    let attr = syn::parse_macro_input!(attr as fake::Attr);
    let item_trait = syn::parse_macro_input!(input as syn::ItemTrait);

    let output = match fake::generate(attr, item_trait) {
        Ok(stream) => stream,
        Err(err) => err.to_compile_error(),
    };

    proc_macro::TokenStream::from(output)
}
