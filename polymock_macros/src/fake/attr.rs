/// Parsed `#[fake]` attribute on the trait
pub struct Attr {
    /// Polymock's prefix, e.g. `::polymock`
    pub prefix: syn::Path,
    /// Name of the module holding the method and member identities
    pub api: Option<syn::Ident>,
}

impl Attr {
    pub fn api_ident(&self, trait_ident: &syn::Ident) -> syn::Ident {
        match &self.api {
            Some(api) => api.clone(),
            None => quote::format_ident!("{}Fake", trait_ident),
        }
    }
}

impl syn::parse::Parse for Attr {
    fn parse(input: syn::parse::ParseStream) -> syn::Result<Self> {
        let mut prefix: Option<syn::Path> = None;
        let mut api: Option<syn::Ident> = None;

        while !input.is_empty() {
            let keyword: syn::Ident = input.parse()?;
            let _: syn::token::Eq = input.parse()?;
            match keyword.to_string().as_str() {
                "prefix" => {
                    prefix = Some(input.parse()?);
                }
                "api" => {
                    api = Some(input.parse()?);
                }
                _ => return Err(syn::Error::new(keyword.span(), "Unrecognized keyword")),
            };

            if input.peek(syn::token::Comma) {
                let _: syn::token::Comma = input.parse()?;
            } else {
                break;
            }
        }

        if !input.is_empty() {
            return Err(input.error("Expected `,`"));
        }

        Ok(Self {
            prefix: prefix.unwrap_or_else(|| syn::parse_quote! { ::polymock }),
            api,
        })
    }
}

/// Parsed `#[fake]` attribute on a trait method
#[derive(Default)]
pub struct MethodAttr {
    /// The data member the method accesses, instead of being dispatched
    pub member: Option<syn::Ident>,
}

impl MethodAttr {
    pub fn from_attrs(attrs: &[syn::Attribute]) -> syn::Result<Self> {
        let mut method_attr = Self::default();

        for attr in attrs.iter().filter(|attr| is_fake_attr(attr)) {
            attr.parse_args_with(|input: syn::parse::ParseStream| {
                let keyword: syn::Ident = input.parse()?;
                let _: syn::token::Eq = input.parse()?;
                match keyword.to_string().as_str() {
                    "member" => {
                        if method_attr.member.is_some() {
                            return Err(syn::Error::new(keyword.span(), "Duplicate `member`"));
                        }
                        method_attr.member = Some(input.parse()?);
                    }
                    _ => return Err(syn::Error::new(keyword.span(), "Unrecognized keyword")),
                }

                Ok(())
            })?;
        }

        Ok(method_attr)
    }
}

pub fn is_fake_attr(attr: &syn::Attribute) -> bool {
    attr.path().is_ident("fake")
}
