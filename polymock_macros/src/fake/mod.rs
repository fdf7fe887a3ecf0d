use proc_macro2::TokenStream;
use quote::quote;
use syn::spanned::Spanned;

mod attr;
mod method;

pub use attr::Attr;
use method::{DispatchedMethod, FakeMethod, MemberAccessor};

/// A distinct data member, possibly accessed by several accessors.
struct Member<'t> {
    ident: &'t syn::Ident,
    value_ty: &'t syn::Type,
}

pub fn generate(attr: Attr, mut item_trait: syn::ItemTrait) -> syn::Result<TokenStream> {
    if !item_trait.generics.params.is_empty() || item_trait.generics.where_clause.is_some() {
        return Err(syn::Error::new(
            item_trait.generics.span(),
            "Generic traits cannot be faked",
        ));
    }

    let input_trait = item_trait.clone();
    let methods = method::extract_methods(&input_trait)?;
    let members = collect_members(&methods)?;
    check_name_collisions(&methods, &members)?;

    strip_fake_attrs(&mut item_trait);

    let prefix = &attr.prefix;
    let vis = &input_trait.vis;
    let item_vis = api_item_visibility(vis);
    let trait_ident = &input_trait.ident;
    let api_ident = attr.api_ident(trait_ident);
    let trait_name = syn::LitStr::new(&trait_ident.to_string(), trait_ident.span());

    let dispatched: Vec<&DispatchedMethod> = methods
        .iter()
        .filter_map(|method| match method {
            FakeMethod::Dispatched(dispatched) => Some(dispatched),
            FakeMethod::Member(_) => None,
        })
        .collect();

    let method_names = dispatched
        .iter()
        .map(|method| ident_lit(method.ident()));
    let member_names = members.iter().map(|member| ident_lit(member.ident));

    let method_structs = dispatched.iter().map(|method| {
        let ident = method.ident();
        let doc = format!("Identity of the faked method [`{trait_ident}::{ident}`](super::{trait_ident}::{ident}).");
        quote! {
            #[doc = #doc]
            #[allow(non_camel_case_types)]
            #item_vis struct #ident;
        }
    });
    let member_structs = members.iter().map(|member| {
        let ident = member.ident;
        let doc = format!("Identity of the faked data member `{ident}` of [`{trait_ident}`](super::{trait_ident}).");
        quote! {
            #[doc = #doc]
            #[allow(non_camel_case_types)]
            #item_vis struct #ident;
        }
    });

    let method_impls = dispatched
        .iter()
        .map(|method| def_method_impl(method, trait_ident, &api_ident, prefix));
    let member_impls = members
        .iter()
        .map(|member| def_member_impl(member, trait_ident, &api_ident, prefix));
    let proxy_fns = methods.iter().map(|method| match method {
        FakeMethod::Dispatched(dispatched) => def_dispatch_fn(dispatched, &api_ident, prefix),
        FakeMethod::Member(accessor) => def_member_fn(accessor, &api_ident, prefix),
    });

    let api_doc = format!("Fake identities of the methods and data members of [`{trait_ident}`](super::{trait_ident}).");

    Ok(quote! {
        #item_trait

        impl #prefix::Interface for dyn #trait_ident {
            const NAME: &'static str = #trait_name;
            const METHODS: &'static [&'static str] = &[#(#method_names),*];
            const MEMBERS: &'static [&'static str] = &[#(#member_names),*];

            fn upcast(proxy: &#prefix::Proxy<Self>) -> &Self {
                proxy
            }

            fn upcast_mut(proxy: &mut #prefix::Proxy<Self>) -> &mut Self {
                proxy
            }
        }

        #[doc = #api_doc]
        #[allow(non_snake_case)]
        #vis mod #api_ident {
            #(#method_structs)*
            #(#member_structs)*
        }

        const _: () = {
            #(#method_impls)*
            #(#member_impls)*

            impl #trait_ident for #prefix::Proxy<dyn #trait_ident> {
                #(#proxy_fns)*
            }
        };
    })
}

fn def_method_impl(
    method: &DispatchedMethod,
    trait_ident: &syn::Ident,
    api_ident: &syn::Ident,
    prefix: &syn::Path,
) -> TokenStream {
    let ident = method.ident();
    let name = ident_lit(ident);
    let args_ty = method.args_ty();
    let output = &method.output;
    let arg_idents: Vec<&syn::Ident> = method.arg_idents().collect();
    let real_call_args = method.real_call_args();
    let try_debug_exprs = (0..method.args.len()).map(|index| {
        let index = syn::Index::from(index);
        quote! { (&args.#index).polymock_try_debug() }
    });

    quote! {
        impl #prefix::Method for #api_ident::#ident {
            type Interface = dyn #trait_ident;
            type Args = #args_ty;
            type Output = #output;
            const NAME: &'static str = #name;

            #[allow(unused_variables)]
            fn debug_args(args: &Self::Args) -> ::std::string::String {
                #[allow(unused_imports)]
                use #prefix::private::{NoDebug, ProperDebug};
                #prefix::private::format_inputs(&[#(#try_debug_exprs),*])
            }

            fn call_real(real: &mut Self::Interface, args: Self::Args) -> Self::Output {
                let (#(#arg_idents,)*) = args;
                real.#ident(#(#real_call_args),*)
            }
        }
    }
}

fn def_member_impl(
    member: &Member,
    trait_ident: &syn::Ident,
    api_ident: &syn::Ident,
    prefix: &syn::Path,
) -> TokenStream {
    let ident = member.ident;
    let name = ident_lit(ident);
    let value_ty = member.value_ty;

    quote! {
        impl #prefix::DataMember for #api_ident::#ident {
            type Interface = dyn #trait_ident;
            type Value = #value_ty;
            const NAME: &'static str = #name;
        }
    }
}

fn def_dispatch_fn(
    method: &DispatchedMethod,
    api_ident: &syn::Ident,
    prefix: &syn::Path,
) -> TokenStream {
    let ident = method.ident();
    let sig = method.renamed_sig();
    let slot = proc_macro2::Literal::usize_suffixed(method.slot);
    let snapshot = method.snapshot_expr();

    quote! {
        #[track_caller]
        #sig {
            #prefix::private::dispatch::<#api_ident::#ident>(self, #slot, #snapshot)
        }
    }
}

fn def_member_fn(
    accessor: &MemberAccessor,
    api_ident: &syn::Ident,
    prefix: &syn::Path,
) -> TokenStream {
    let sig = &accessor.method.sig;
    let member = &accessor.member;

    if accessor.mutable {
        quote! {
            #[track_caller]
            #sig {
                #prefix::private::member_mut::<#api_ident::#member>(self)
            }
        }
    } else {
        quote! {
            #[track_caller]
            #sig {
                #prefix::private::member::<#api_ident::#member>(self)
            }
        }
    }
}

fn collect_members<'t>(methods: &'t [FakeMethod<'t>]) -> syn::Result<Vec<Member<'t>>> {
    let mut members: Vec<Member> = vec![];

    for accessor in methods.iter().filter_map(|method| match method {
        FakeMethod::Member(accessor) => Some(accessor),
        FakeMethod::Dispatched(_) => None,
    }) {
        match members
            .iter()
            .find(|member| *member.ident == accessor.member)
        {
            Some(member) => {
                let declared = member.value_ty;
                let value_ty = accessor.value_ty;
                if quote!(#declared).to_string() != quote!(#value_ty).to_string() {
                    return Err(syn::Error::new(
                        value_ty.span(),
                        format!(
                            "Data member `{}` is accessed with another type elsewhere",
                            accessor.member
                        ),
                    ));
                }
            }
            None => members.push(Member {
                ident: &accessor.member,
                value_ty: accessor.value_ty,
            }),
        }
    }

    Ok(members)
}

fn check_name_collisions(methods: &[FakeMethod], members: &[Member]) -> syn::Result<()> {
    for method in methods {
        if let FakeMethod::Dispatched(dispatched) = method {
            if members.iter().any(|member| member.ident == dispatched.ident()) {
                return Err(syn::Error::new(
                    dispatched.ident().span(),
                    "A dispatched method cannot share its name with a data member",
                ));
            }
        }
    }

    Ok(())
}

fn strip_fake_attrs(item_trait: &mut syn::ItemTrait) {
    for item in &mut item_trait.items {
        if let syn::TraitItem::Fn(method) = item {
            method.attrs.retain(|attr| !attr::is_fake_attr(attr));
        }
    }
}

/// Visibility of the items inside the api module, so that they are exactly as visible as the trait.
fn api_item_visibility(trait_vis: &syn::Visibility) -> TokenStream {
    match trait_vis {
        syn::Visibility::Public(_) => quote! { pub },
        syn::Visibility::Inherited => quote! { pub(super) },
        syn::Visibility::Restricted(restricted) => {
            let path = &restricted.path;
            let first = path.segments.first().map(|segment| segment.ident.to_string());

            match first.as_deref() {
                Some("crate") if path.leading_colon.is_none() => quote! { #trait_vis },
                Some("self") => {
                    let rest = path.segments.iter().skip(1);
                    quote! { pub(in super #(::#rest)*) }
                }
                Some("super") => quote! { pub(in super::#path) },
                _ => quote! { #trait_vis },
            }
        }
    }
}

fn ident_lit(ident: &syn::Ident) -> syn::LitStr {
    syn::LitStr::new(&ident.to_string(), ident.span())
}
