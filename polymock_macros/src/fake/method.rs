use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use syn::spanned::Spanned;

use super::attr::MethodAttr;

/// A trait method, classified.
pub enum FakeMethod<'t> {
    /// Dispatched through the table.
    Dispatched(DispatchedMethod<'t>),
    /// Accessor of a faked data member.
    Member(MemberAccessor<'t>),
}

pub struct DispatchedMethod<'t> {
    pub method: &'t syn::TraitItemFn,
    pub slot: usize,
    pub args: Vec<Arg<'t>>,
    pub output: syn::Type,
}

pub struct MemberAccessor<'t> {
    pub method: &'t syn::TraitItemFn,
    pub member: syn::Ident,
    pub mutable: bool,
    pub value_ty: &'t syn::Type,
}

pub struct Arg<'t> {
    pub ident: syn::Ident,
    pub ty: &'t syn::Type,
    pub class: ArgClass<'t>,
}

pub enum ArgClass<'t> {
    /// Passed by value, snapshotted by moving it.
    Owned,
    /// Passed as `&T`, snapshotted through `ToOwned`.
    Borrowed(&'t syn::Type),
}

pub fn extract_methods(item_trait: &syn::ItemTrait) -> syn::Result<Vec<FakeMethod<'_>>> {
    let mut slot = 0;
    let mut methods = vec![];

    for item in &item_trait.items {
        let method = match item {
            syn::TraitItem::Fn(method) => method,
            other => {
                return Err(syn::Error::new(
                    other.span(),
                    "Only methods are supported in faked traits",
                ))
            }
        };

        validate_sig(&method.sig)?;
        let method_attr = MethodAttr::from_attrs(&method.attrs)?;

        match method_attr.member {
            Some(member) => {
                methods.push(FakeMethod::Member(MemberAccessor::analyze(method, member)?));
            }
            None => {
                methods.push(FakeMethod::Dispatched(DispatchedMethod::analyze(method, slot)?));
                slot += 1;
            }
        }
    }

    Ok(methods)
}

fn validate_sig(sig: &syn::Signature) -> syn::Result<()> {
    if let Some(asyncness) = &sig.asyncness {
        return Err(syn::Error::new(
            asyncness.span(),
            "async methods are not supported",
        ));
    }

    if let Some(param) = sig
        .generics
        .params
        .iter()
        .find(|param| !matches!(param, syn::GenericParam::Lifetime(_)))
    {
        return Err(syn::Error::new(
            param.span(),
            "Generic methods cannot be called through a trait object",
        ));
    }

    match sig.inputs.first() {
        Some(syn::FnArg::Receiver(receiver))
            if receiver.reference.is_some() && receiver.colon_token.is_none() =>
        {
            Ok(())
        }
        _ => Err(syn::Error::new(
            sig.span(),
            "Faked methods must take `&self` or `&mut self`",
        )),
    }
}

fn receiver_is_mut(sig: &syn::Signature) -> bool {
    matches!(
        sig.inputs.first(),
        Some(syn::FnArg::Receiver(receiver)) if receiver.mutability.is_some()
    )
}

impl<'t> DispatchedMethod<'t> {
    fn analyze(method: &'t syn::TraitItemFn, slot: usize) -> syn::Result<Self> {
        let args = method
            .sig
            .inputs
            .iter()
            .skip(1)
            .enumerate()
            .map(|(index, fn_arg)| match fn_arg {
                syn::FnArg::Typed(pat_type) => Arg::analyze(index, &pat_type.ty),
                syn::FnArg::Receiver(receiver) => {
                    Err(syn::Error::new(receiver.span(), "Unexpected receiver"))
                }
            })
            .collect::<syn::Result<Vec<_>>>()?;

        let output = match &method.sig.output {
            syn::ReturnType::Default => syn::parse_quote! { () },
            syn::ReturnType::Type(_, ty) => match ty.as_ref() {
                syn::Type::Reference(_) => {
                    return Err(syn::Error::new(
                        ty.span(),
                        "Reference return types are only supported for data member accessors, see `#[fake(member = ..)]`",
                    ))
                }
                syn::Type::ImplTrait(_) => {
                    return Err(syn::Error::new(
                        ty.span(),
                        "`impl Trait` cannot be returned through a trait object",
                    ))
                }
                ty => ty.clone(),
            },
        };

        Ok(Self {
            method,
            slot,
            args,
            output,
        })
    }

    pub fn ident(&self) -> &'t syn::Ident {
        &self.method.sig.ident
    }

    /// The owned snapshot type of the arguments, as a tuple.
    pub fn args_ty(&self) -> TokenStream {
        let tys = self.args.iter().map(|arg| match &arg.class {
            ArgClass::Owned => {
                let ty = arg.ty;
                quote! { #ty }
            }
            ArgClass::Borrowed(referent) => {
                quote! { <#referent as ::std::borrow::ToOwned>::Owned }
            }
        });

        quote! { (#(#tys,)*) }
    }

    /// Expression building the snapshot tuple from the renamed arguments.
    pub fn snapshot_expr(&self) -> TokenStream {
        let exprs = self.args.iter().map(|arg| {
            let ident = &arg.ident;
            match &arg.class {
                ArgClass::Owned => quote! { #ident },
                ArgClass::Borrowed(_) => quote! { ::std::borrow::ToOwned::to_owned(#ident) },
            }
        });

        quote! { (#(#exprs,)*) }
    }

    /// Arguments for calling the method on a real object, given the destructured snapshot.
    pub fn real_call_args(&self) -> impl Iterator<Item = TokenStream> + '_ {
        self.args.iter().map(|arg| {
            let ident = &arg.ident;
            match &arg.class {
                ArgClass::Owned => quote! { #ident },
                ArgClass::Borrowed(_) => quote! { ::core::borrow::Borrow::borrow(&#ident) },
            }
        })
    }

    pub fn arg_idents(&self) -> impl Iterator<Item = &syn::Ident> + '_ {
        self.args.iter().map(|arg| &arg.ident)
    }

    /// The signature with every argument pattern replaced by its generated ident.
    pub fn renamed_sig(&self) -> syn::Signature {
        rename_sig(&self.method.sig, &self.args)
    }
}

impl<'t> Arg<'t> {
    fn analyze(index: usize, ty: &'t syn::Type) -> syn::Result<Self> {
        let class = match ty {
            syn::Type::Reference(reference) if reference.mutability.is_some() => {
                return Err(syn::Error::new(
                    ty.span(),
                    "`&mut` arguments cannot be snapshotted",
                ))
            }
            syn::Type::Reference(reference) => ArgClass::Borrowed(&*reference.elem),
            syn::Type::ImplTrait(_) => {
                return Err(syn::Error::new(
                    ty.span(),
                    "`impl Trait` arguments cannot be passed through a trait object",
                ))
            }
            _ => ArgClass::Owned,
        };

        Ok(Self {
            ident: format_ident!("__a{}", index),
            ty,
            class,
        })
    }
}

impl<'t> MemberAccessor<'t> {
    fn analyze(method: &'t syn::TraitItemFn, member: syn::Ident) -> syn::Result<Self> {
        let sig = &method.sig;
        if sig.inputs.len() != 1 {
            return Err(syn::Error::new(
                sig.inputs.span(),
                "Data member accessors take no arguments besides the receiver",
            ));
        }

        let mutable = receiver_is_mut(sig);
        let value_ty = match &sig.output {
            syn::ReturnType::Type(_, ty) => match ty.as_ref() {
                syn::Type::Reference(reference)
                    if reference.mutability.is_some() == mutable =>
                {
                    &*reference.elem
                }
                _ => return Err(accessor_output_error(ty.span(), mutable)),
            },
            syn::ReturnType::Default => {
                return Err(accessor_output_error(sig.span(), mutable));
            }
        };

        Ok(Self {
            method,
            member,
            mutable,
            value_ty,
        })
    }
}

fn accessor_output_error(span: proc_macro2::Span, mutable: bool) -> syn::Error {
    if mutable {
        syn::Error::new(span, "A data member accessor taking `&mut self` must return `&mut T`")
    } else {
        syn::Error::new(span, "A data member accessor taking `&self` must return `&T`")
    }
}

fn rename_sig(sig: &syn::Signature, args: &[Arg]) -> syn::Signature {
    let mut sig = sig.clone();

    for (fn_arg, arg) in sig.inputs.iter_mut().skip(1).zip(args) {
        if let syn::FnArg::Typed(pat_type) = fn_arg {
            let ident = &arg.ident;
            *pat_type.pat = syn::parse_quote! { #ident };
            pat_type.attrs.clear();
        }
    }

    sig
}
