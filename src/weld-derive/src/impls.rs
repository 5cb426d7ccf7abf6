use proc_macro::TokenStream;
use proc_macro2::{Span, TokenStream as TokenStream2};
use quote::quote;
use syn::spanned::Spanned;
use syn::visit_mut::VisitMut;
use syn::{
    AngleBracketedGenericArguments, Attribute, Error as SynError, Expr, FnArg, GenericArgument,
    Ident, ImplItem, ImplItemFn, ItemImpl, Meta, Pat, PatType, PathArguments, Result as SynResult,
    ReturnType, Type, TypePath, Visibility,
};

use crate::attrs::AttributeData;

#[derive(Debug)]
struct MemberData {
    identifier: Ident,
    public: bool,
    receiver: bool,
    arguments: Vec<ArgumentData>,
    fallible: bool,
}

#[derive(Debug)]
struct ArgumentData {
    span: Span,
    name: Option<String>,
    ty: Type,
    kind: ArgumentKind,
    qualifier: Option<Expr>,
}

#[derive(Debug)]
enum ArgumentKind {
    Value,
    Nullable,
    Provider,
}

struct AttributeRemovalVisitor;

impl AttributeRemovalVisitor {
    fn is_custom_attribute(attr: &Attribute) -> bool {
        match &attr.meta {
            Meta::Path(path) => ["inject", "nullable", "provider"]
                .iter()
                .any(|name| path.is_ident(name)),
            Meta::List(list) => list.path.is_ident("named"),
            Meta::NameValue(_) => false,
        }
    }
}

impl VisitMut for AttributeRemovalVisitor {
    fn visit_impl_item_fn_mut(&mut self, item: &mut ImplItemFn) {
        item.attrs.retain(|attr| !Self::is_custom_attribute(attr));
        for input in item.sig.inputs.iter_mut() {
            if let FnArg::Typed(arg) = input {
                self.visit_pat_type_mut(arg);
            }
        }
    }

    fn visit_pat_type_mut(&mut self, arg: &mut PatType) {
        arg.attrs.retain(|attr| !Self::is_custom_attribute(attr));
    }
}

pub fn expand_implementation(
    impls: TokenStream,
    attr_data: AttributeData,
) -> SynResult<TokenStream2> {
    let mut impls = match syn::parse::<ItemImpl>(impls) {
        Ok(impls) => impls,
        Err(err) => {
            return Err(SynError::new(
                err.span(),
                "`#[component]` should be annotated on the `impl` block",
            ))
        }
    };

    let self_type = get_self_type(&impls)?;
    let members = impls
        .items
        .iter()
        .filter_map(filter_and_map_item_fn)
        .filter(is_annotated_with_inject)
        .map(|item| parse_member(item, &self_type))
        .collect::<SynResult<Vec<_>>>()?;
    if members.is_empty() {
        return Err(SynError::new(
            impls.span(),
            "no associated function is annotated with `#[inject]`",
        ));
    }

    let expanded = expand_introspect_implementation(&self_type, &members, attr_data);

    let mut visitor = AttributeRemovalVisitor;
    visitor.visit_item_impl_mut(&mut impls);

    Ok(quote! {
        #impls
        #expanded
    })
}

fn get_self_type(impls: &ItemImpl) -> SynResult<TypePath> {
    if !impls.generics.params.is_empty() {
        return Err(SynError::new(
            impls.generics.span(),
            "generic components are not supported",
        ));
    }
    if let Type::Path(ty) = impls.self_ty.as_ref() {
        Ok(ty.clone())
    } else {
        Err(SynError::new(impls.self_ty.span(), "invalid self type"))
    }
}

fn filter_and_map_item_fn(item: &ImplItem) -> Option<&ImplItemFn> {
    if let ImplItem::Fn(impl_fn) = item {
        Some(impl_fn)
    } else {
        None
    }
}

fn is_annotated_with_inject(item_fn: &&ImplItemFn) -> bool {
    item_fn
        .attrs
        .iter()
        .any(|attr| matches!(&attr.meta, Meta::Path(path) if path.is_ident("inject")))
}

fn parse_member(item: &ImplItemFn, self_type: &TypePath) -> SynResult<MemberData> {
    let signature = &item.sig;
    let receiver = match signature.inputs.first() {
        Some(FnArg::Receiver(rec)) if rec.reference.is_none() => {
            return Err(SynError::new(
                rec.span(),
                "a method annotated with `#[inject]` should take `&mut self` or `&self`",
            ));
        }
        Some(FnArg::Receiver(_)) => true,
        _ => false,
    };

    let arguments = signature
        .inputs
        .iter()
        .filter_map(|arg| match arg {
            FnArg::Typed(arg) => Some(arg),
            FnArg::Receiver(_) => None,
        })
        .map(parse_argument)
        .collect::<SynResult<Vec<_>>>()?;

    let fallible = if receiver {
        is_result_type(&signature.output)
    } else {
        parse_constructor_return_type(&signature.output, self_type)?
    };

    Ok(MemberData {
        identifier: signature.ident.clone(),
        public: !matches!(item.vis, Visibility::Inherited),
        receiver,
        arguments,
        fallible,
    })
}

fn parse_argument(arg: &PatType) -> SynResult<ArgumentData> {
    let name = match arg.pat.as_ref() {
        Pat::Ident(pat) => Some(pat.ident.to_string().trim_start_matches('_').to_string()),
        _ => None,
    };

    let mut kind = ArgumentKind::Value;
    let mut qualifier = None;
    for attr in &arg.attrs {
        match &attr.meta {
            Meta::Path(path) if path.is_ident("nullable") || path.is_ident("provider") => {
                if !matches!(kind, ArgumentKind::Value) {
                    return Err(SynError::new(
                        path.span(),
                        "only one of `#[nullable]` and `#[provider]` is allowed",
                    ));
                }
                kind = if path.is_ident("nullable") {
                    ArgumentKind::Nullable
                } else {
                    ArgumentKind::Provider
                };
            }
            Meta::List(list) if list.path.is_ident("named") => {
                if qualifier.is_some() {
                    return Err(SynError::new(
                        list.span(),
                        "only one `#[named(...)]` is allowed",
                    ));
                }
                qualifier = Some(list.parse_args::<Expr>()?);
            }
            Meta::Path(path) if path.is_ident("named") => {
                return Err(SynError::new(
                    path.span(),
                    "expects `#[named(...)]` to receive a `&'static str`",
                ));
            }
            Meta::NameValue(nv) if nv.path.is_ident("named") => {
                return Err(SynError::new(
                    nv.span(),
                    "expects `#[named(...)]` to receive a `&'static str`",
                ));
            }
            _ => {}
        }
    }

    let ty = match kind {
        ArgumentKind::Value => arg.ty.as_ref().clone(),
        ArgumentKind::Nullable => unwrap_generic(&arg.ty, "Option")?,
        ArgumentKind::Provider => unwrap_generic(&arg.ty, "Provider")?,
    };

    Ok(ArgumentData {
        span: arg.span(),
        name,
        ty,
        kind,
        qualifier,
    })
}

/// Extracts `V` from `Wrapper<V>`.
fn unwrap_generic(ty: &Type, wrapper: &str) -> SynResult<Type> {
    let error = || SynError::new(ty.span(), format!("expects the argument to be `{wrapper}<V>`"));
    let Type::Path(path) = ty else {
        return Err(error());
    };
    let segment = path.path.segments.last().ok_or_else(error)?;
    if segment.ident != wrapper {
        return Err(error());
    }
    match &segment.arguments {
        PathArguments::AngleBracketed(AngleBracketedGenericArguments { args, .. })
            if args.len() == 1 =>
        {
            match args.first() {
                Some(GenericArgument::Type(inner)) => Ok(inner.clone()),
                _ => Err(error()),
            }
        }
        _ => Err(error()),
    }
}

/// Returns whether the constructor returns `Result<Self, E>` rather than
/// `Self`.
fn parse_constructor_return_type(output: &ReturnType, self_type: &TypePath) -> SynResult<bool> {
    let error = || {
        SynError::new(
            output.span(),
            "a constructor's return type should be `Self` or `Result<Self, E>`",
        )
    };
    let ReturnType::Type(_, return_type) = output else {
        return Err(error());
    };
    let Type::Path(return_type) = return_type.as_ref() else {
        return Err(error());
    };

    if is_self(return_type, self_type) {
        return Ok(false);
    }
    match result_arguments(return_type) {
        Some((Type::Path(ok), _)) if is_self(ok, self_type) => Ok(true),
        _ => Err(error()),
    }
}

fn is_self(ty: &TypePath, self_type: &TypePath) -> bool {
    ty == self_type || ty.path.is_ident("Self")
}

fn is_result_type(output: &ReturnType) -> bool {
    match output {
        ReturnType::Type(_, ty) => match ty.as_ref() {
            Type::Path(ty) => result_arguments(ty).is_some(),
            _ => false,
        },
        ReturnType::Default => false,
    }
}

/// Returns `T` and `E` of a `Result<T, E>`.
fn result_arguments(ty: &TypePath) -> Option<(&Type, &Type)> {
    let segment = ty.path.segments.last()?;
    if segment.ident != "Result" {
        return None;
    }
    let PathArguments::AngleBracketed(AngleBracketedGenericArguments { args, .. }) =
        &segment.arguments
    else {
        return None;
    };
    match (args.first(), args.get(1), args.len()) {
        (Some(GenericArgument::Type(ok)), Some(GenericArgument::Type(err)), 2) => Some((ok, err)),
        _ => None,
    }
}

fn expand_introspect_implementation(
    self_type: &TypePath,
    members: &[MemberData],
    attr_data: AttributeData,
) -> TokenStream2 {
    let supertypes = attr_data
        .supertypes
        .iter()
        .map(|supertype| {
            let target = &supertype.target;
            let upcast = &supertype.upcast;
            quote! { .assignable_to(|this: Self| -> #target { (#upcast)(this) }) }
        })
        .collect::<TokenStream2>();

    let members = members.iter().map(expand_member).collect::<TokenStream2>();

    quote! {
        impl weld::introspect::Introspect for #self_type {
            fn implementation() -> weld::introspect::Implementation {
                weld::introspect::Implementation::builder::<Self>()
                    #supertypes
                    #members
                    .build()
            }
        }
    }
}

fn expand_member(member: &MemberData) -> TokenStream2 {
    let identifier = &member.identifier;
    let name = identifier.to_string();

    let slots = member
        .arguments
        .iter()
        .map(expand_slot)
        .collect::<TokenStream2>();
    let private = (!member.public).then(|| quote! { .private() });
    let annotated = member.receiver.then(|| quote! { .annotated() });
    let descriptor = quote! {
        weld::introspect::Member::new(#name) #slots #private #annotated
    };

    let take_statements = member
        .arguments
        .iter()
        .enumerate()
        .map(|(i, arg)| {
            let dep = Ident::new(&format!("dep{i}"), arg.span);
            match arg.kind {
                ArgumentKind::Value => quote! { let #dep = args.take()?; },
                ArgumentKind::Nullable => quote! { let #dep = args.take_nullable()?; },
                ArgumentKind::Provider => quote! { let #dep = args.take_provider()?; },
            }
        })
        .collect::<TokenStream2>();

    let args = if member.arguments.is_empty() {
        quote! { _args }
    } else {
        quote! { args }
    };

    let dep_args = member
        .arguments
        .iter()
        .enumerate()
        .map(|(i, arg)| {
            let dep = Ident::new(&format!("dep{i}"), arg.span);
            quote! { #dep, }
        })
        .collect::<TokenStream2>();

    match (member.receiver, member.fallible) {
        (false, false) => quote! {
            .constructor(#descriptor, |#args: &mut weld::introspect::Arguments| {
                #take_statements
                ::std::result::Result::Ok(Self::#identifier(#dep_args))
            })
        },
        (false, true) => quote! {
            .fallible_constructor(#descriptor, |#args: &mut weld::introspect::Arguments| {
                #take_statements
                ::std::result::Result::Ok(Self::#identifier(#dep_args))
            })
        },
        (true, false) => quote! {
            .method(#descriptor, |this: &mut Self, #args: &mut weld::introspect::Arguments| {
                #take_statements
                ::std::result::Result::Ok(this.#identifier(#dep_args))
            })
        },
        (true, true) => quote! {
            .fallible_method(#descriptor, |this: &mut Self, #args: &mut weld::introspect::Arguments| {
                #take_statements
                ::std::result::Result::Ok(this.#identifier(#dep_args))
            })
        },
    }
}

fn expand_slot(arg: &ArgumentData) -> TokenStream2 {
    let ty = &arg.ty;
    let slot = match arg.kind {
        ArgumentKind::Value => quote! { weld::introspect::Slot::of::<#ty>() },
        ArgumentKind::Nullable => quote! { weld::introspect::Slot::of::<#ty>().nullable() },
        ArgumentKind::Provider => quote! { weld::introspect::Slot::provider::<#ty>() },
    };
    let name = arg.name.as_ref().map(|name| quote! { .named(#name) });
    let qualifier = arg.qualifier.as_ref().map(|q| quote! { .qualified(#q) });
    quote! { .slot(#slot #name #qualifier) }
}
