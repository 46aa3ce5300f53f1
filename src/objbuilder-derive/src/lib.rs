mod attrs;
mod impls;

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use syn::Result as SynResult;

/// Implements `Component` and `Descriptor` for the type of the annotated
/// `impl` block.
///
/// - The associated function marked `#[inject]` is the constructor. It
///   returns `Self` or `Result<Self, E>`, and each argument is built from the
///   container: `Arc<T>` arguments with `get`, and `Vec<Arc<T>>` arguments
///   marked `#[collect]` with `get_all`.
/// - Methods marked `#[property]` named `set_<name>` become properties which
///   can be configured with `configure_property`. Methods marked
///   `#[property(inject)]` take an `Arc<D>` and are wired whenever `D` is
///   registered.
/// - `#[component(expose(dyn A, dyn B))]` makes the type discoverable by
///   `build_all::<dyn A>()`, and `#[component(dispose)]` makes its
///   `Dispose` implementation run when the owning scope ends.
#[proc_macro_attribute]
pub fn component(attr: TokenStream, item: TokenStream) -> TokenStream {
    match component_impl(attr, item) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.into_compile_error().into(),
    }
}

fn component_impl(attr: TokenStream, item: TokenStream) -> SynResult<TokenStream2> {
    let attr_data = attrs::parse_attributes(attr)?;
    let expanded = impls::expand_implementation(item, attr_data)?;
    Ok(expanded)
}
