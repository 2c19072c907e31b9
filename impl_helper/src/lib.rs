use proc_macro::TokenStream;
use quote::quote;
use syn::{meta::ParseNestedMeta, parse_macro_input, Data, DeriveInput, Field, Fields};

#[derive(Default)]
struct Helpers {
    get: bool,
    copy: bool,
    get_mut: bool,
    set: bool,
    upd: bool,
}

impl Helpers {
    fn parse_meta(&mut self, meta: ParseNestedMeta) -> syn::Result<()> {
        let ident = meta
            .path
            .get_ident()
            .map(|ident| ident.to_string())
            .unwrap_or_default();

        match ident.as_str() {
            "get" => self.get = true,
            "copy" => self.copy = true,
            "get_mut" => self.get_mut = true,
            "set" => self.set = true,
            "upd" => self.upd = true,
            "all" => {
                self.get = true;
                self.get_mut = true;
                self.set = true;
                self.upd = true;
            }
            _ => {
                return Err(meta.error(format!(
                    "Unexpected expression in macro: {:?}. Expected one of: get, copy, get_mut, set, upd or all",
                    meta.path
                        .segments
                        .iter()
                        .map(|segment| segment.ident.to_string())
                        .collect::<Vec<_>>()
                        .join("::")
                )))
            }
        }

        if self.get && self.copy {
            return Err(meta.error("`get` and `copy` generate the same getter, pick one"));
        }

        Ok(())
    }

    fn from_field(field: &Field) -> syn::Result<Self> {
        let mut helpers = Self::default();

        for attr in field.attrs.iter().filter(|attr| attr.path().is_ident("helper")) {
            attr.parse_nested_meta(|meta| helpers.parse_meta(meta))?;
        }

        Ok(helpers)
    }
}

fn field_methods(field: &Field, helpers: &Helpers) -> Vec<proc_macro2::TokenStream> {
    let mut methods = Vec::default();

    let Some(field_name) = field.ident.as_ref() else {
        return methods;
    };
    let field_type = &field.ty;
    let suffixed = |suffix: &str| syn::Ident::new(&format!("{}_{}", field_name, suffix), field_name.span());

    if helpers.get {
        methods.push(quote! {
            pub fn #field_name(&self) -> &#field_type {
                &self.#field_name
            }
        });
    }

    if helpers.copy {
        methods.push(quote! {
            pub fn #field_name(&self) -> #field_type {
                self.#field_name
            }
        });
    }

    if helpers.get_mut {
        let fn_name = suffixed("mut");

        methods.push(quote! {
            pub fn #fn_name(&mut self) -> &mut #field_type {
                &mut self.#field_name
            }
        });
    }

    if helpers.set {
        let fn_name = suffixed("set");

        methods.push(quote! {
            #[must_use = "method moves the value of self and returns the modified value"]
            pub fn #fn_name(mut self, value: #field_type) -> Self {
                self.#field_name = value;
                self
            }
        });
    }

    if helpers.upd {
        let fn_name = suffixed("update");

        methods.push(quote! {
            pub fn #fn_name(&mut self, value: #field_type) -> &mut Self {
                self.#field_name = value;
                self
            }
        });
    }

    methods
}

/// Generates accessors for the fields marked with `#[helper(...)]`:
/// `get` (`&T`), `copy` (`T` for `Copy` fields), `get_mut`, `set` (builder) and `upd`
#[proc_macro_derive(ImplHelper, attributes(helper))]
pub fn impl_helper(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    let name = input.ident;
    let (impl_generics, type_generics, where_clause) = input.generics.split_for_impl();

    let mut methods = Vec::default();

    if let Data::Struct(data_struct) = input.data {
        if let Fields::Named(fields) = data_struct.fields {
            for field in fields.named.iter() {
                match Helpers::from_field(field) {
                    Ok(helpers) => methods.extend(field_methods(field, &helpers)),
                    Err(err) => return err.to_compile_error().into(),
                }
            }
        }
    }

    TokenStream::from(quote! {
        impl #impl_generics #name #type_generics #where_clause {
            #(#methods)*
        }
    })
}
