use proc_macro::TokenStream;
use proc_macro2::{Span, TokenStream as TokenStream2};
use quote::quote;
use syn::punctuated::Punctuated;
use syn::spanned::Spanned;
use syn::token::Comma;
use syn::visit_mut::{self, VisitMut};
use syn::{
    AngleBracketedGenericArguments, Attribute, Error as SynError, FnArg, GenericArgument, Ident,
    ImplItem, ImplItemFn, ItemImpl, LitStr, Meta, PathArguments, Result as SynResult, ReturnType,
    Signature, Type, TypePath,
};

use crate::attrs::AttributeData;

const RETURN_TYPE_MESSAGE: &str = "a constructor's return type should be `Self` or `Result<Self, E>`";

#[derive(Debug)]
struct ConstructorData {
    self_type: TypePath,
    identifier: Ident,
    arguments: Vec<ArgumentData>,
    return_type: ReturnTypeData,
}

#[derive(Debug)]
struct ArgumentData {
    span: Span,
    collect: bool,
}

#[derive(Debug)]
enum ReturnTypeData {
    Infallible,
    Result { error_type: TypePath },
}

#[derive(Debug)]
struct PropertyData {
    name: LitStr,
    setter: Ident,
    kind: PropertyKind,
}

#[derive(Debug)]
enum PropertyKind {
    Value(Type),
    Dependency(Type),
}

struct AttributeRemovalVisitor;

impl AttributeRemovalVisitor {
    fn is_custom_attribute(attr: &Attribute) -> bool {
        let path = attr.meta.path();
        path.is_ident("inject") || path.is_ident("collect") || path.is_ident("property")
    }
}

impl VisitMut for AttributeRemovalVisitor {
    fn visit_attributes_mut(&mut self, attrs: &mut Vec<Attribute>) {
        attrs.retain(|attr| !Self::is_custom_attribute(attr));
        attrs
            .iter_mut()
            .for_each(|attr| visit_mut::visit_attribute_mut(self, attr));
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
    let signature = get_constructor_signature(&impls.items, impls.span())?;
    let ctor_data = parse_constructor(self_type, signature)?;
    let properties = parse_properties(&impls.items)?;

    let component = expand_component_implementation(&ctor_data);
    let descriptor = expand_descriptor_implementation(&ctor_data.self_type, &properties, &attr_data);

    let mut visitor = AttributeRemovalVisitor;
    visitor.visit_item_impl_mut(&mut impls);

    Ok(quote! {
        #impls
        #descriptor
        #component
    })
}

fn get_self_type(impls: &ItemImpl) -> SynResult<TypePath> {
    if let Type::Path(ty) = impls.self_ty.as_ref() {
        Ok(ty.clone())
    } else {
        Err(SynError::new(impls.self_ty.span(), "invalid self type"))
    }
}

fn get_constructor_signature(items: &[ImplItem], impl_span: Span) -> SynResult<Signature> {
    let ctors: Vec<_> = items
        .iter()
        .filter_map(filter_and_map_item_fn)
        .filter(|item_fn| is_annotated_with(item_fn, "inject"))
        .collect();

    let signature = if ctors.len() > 1 {
        return Err(SynError::new(
            impl_span,
            "only one associated function can be annotated with `#[inject]`",
        ));
    } else if let Some(&ctor) = ctors.first() {
        ctor.sig.clone()
    } else {
        return Err(SynError::new(
            impl_span,
            "no associated function is annotated with `#[inject]`",
        ));
    };

    if let Some(FnArg::Receiver(rec)) = signature.inputs.first() {
        return Err(SynError::new(
            rec.span(),
            "method is not allowed to be annotated with `#[inject]`",
        ));
    }

    Ok(signature)
}

fn filter_and_map_item_fn(item: &ImplItem) -> Option<&ImplItemFn> {
    if let ImplItem::Fn(impl_fn) = item {
        Some(impl_fn)
    } else {
        None
    }
}

fn is_annotated_with(item_fn: &ImplItemFn, name: &str) -> bool {
    item_fn
        .attrs
        .iter()
        .any(|attr| attr.meta.path().is_ident(name))
}

fn parse_constructor(self_type: TypePath, signature: Signature) -> SynResult<ConstructorData> {
    let identifier = signature.ident;
    let arguments = parse_constructor_arguments(signature.inputs)?;
    let return_type = parse_constructor_return_type(signature.output, &self_type)?;

    Ok(ConstructorData {
        self_type,
        identifier,
        arguments,
        return_type,
    })
}

fn parse_constructor_arguments(inputs: Punctuated<FnArg, Comma>) -> SynResult<Vec<ArgumentData>> {
    inputs
        .into_iter()
        .map(|arg| {
            let FnArg::Typed(arg) = arg else {
                unreachable!("a constructor should not have a receiver argument");
            };
            let span = arg.span();
            let mut collect = false;
            for attr in &arg.attrs {
                if attr.meta.path().is_ident("collect") {
                    attr.meta.require_path_only()?;
                    collect = true;
                }
            }
            Ok(ArgumentData { span, collect })
        })
        .collect()
}

fn parse_constructor_return_type(
    output: ReturnType,
    self_type: &TypePath,
) -> SynResult<ReturnTypeData> {
    let ReturnType::Type(_, return_type) = output else {
        return Err(SynError::new(output.span(), RETURN_TYPE_MESSAGE));
    };
    let Type::Path(return_type) = *return_type else {
        return Err(SynError::new(return_type.span(), RETURN_TYPE_MESSAGE));
    };

    let segments = &return_type.path.segments;
    let is_single = |ident: &str| segments.len() == 1 && segments[0].ident == ident;

    if &return_type == self_type || is_single("Self") {
        Ok(ReturnTypeData::Infallible)
    } else if is_single("Result") {
        parse_result_return_type(&segments[0].arguments, self_type)
    } else if segments.len() == 3
        && segments[0].ident == "std"
        && segments[1].ident == "result"
        && segments[2].ident == "Result"
    {
        parse_result_return_type(&segments[2].arguments, self_type)
    } else {
        Err(SynError::new(return_type.span(), RETURN_TYPE_MESSAGE))
    }
}

fn parse_result_return_type(
    type_args: &PathArguments,
    self_type: &TypePath,
) -> SynResult<ReturnTypeData> {
    let PathArguments::AngleBracketed(AngleBracketedGenericArguments {
        args: type_args, ..
    }) = type_args
    else {
        return Err(SynError::new(type_args.span(), RETURN_TYPE_MESSAGE));
    };

    if type_args.len() != 2 {
        return Err(SynError::new(type_args.span(), RETURN_TYPE_MESSAGE));
    }

    let (
        GenericArgument::Type(Type::Path(first_type)),
        GenericArgument::Type(Type::Path(second_type)),
    ) = (&type_args[0], &type_args[1])
    else {
        return Err(SynError::new(type_args.span(), RETURN_TYPE_MESSAGE));
    };

    let is_self = first_type == self_type
        || first_type
            .path
            .segments
            .first()
            .is_some_and(|s| s.ident == "Self");

    if is_self {
        Ok(ReturnTypeData::Result {
            error_type: second_type.clone(),
        })
    } else {
        Err(SynError::new(type_args.span(), RETURN_TYPE_MESSAGE))
    }
}

fn parse_properties(items: &[ImplItem]) -> SynResult<Vec<PropertyData>> {
    items
        .iter()
        .filter_map(filter_and_map_item_fn)
        .filter(|item_fn| is_annotated_with(item_fn, "property"))
        .map(parse_property)
        .collect()
}

fn parse_property(item_fn: &ImplItemFn) -> SynResult<PropertyData> {
    let signature = &item_fn.sig;
    let setter = signature.ident.clone();

    let Some(name) = setter.to_string().strip_prefix("set_").map(str::to_string) else {
        return Err(SynError::new(
            setter.span(),
            "a property setter should be named `set_<property>`",
        ));
    };

    let mut inputs = signature.inputs.iter();
    let (Some(FnArg::Receiver(receiver)), Some(FnArg::Typed(value)), None) =
        (inputs.next(), inputs.next(), inputs.next())
    else {
        return Err(SynError::new(
            signature.inputs.span(),
            "a property setter should take `&mut self` and exactly one value",
        ));
    };
    if receiver.mutability.is_none() || receiver.reference.is_none() {
        return Err(SynError::new(
            receiver.span(),
            "a property setter should take `&mut self`",
        ));
    }

    let inject = property_is_injected(item_fn)?;
    let value_type = value.ty.as_ref().clone();
    let kind = if inject {
        PropertyKind::Dependency(arc_inner_type(&value_type)?)
    } else {
        PropertyKind::Value(value_type)
    };

    Ok(PropertyData {
        name: LitStr::new(&name, setter.span()),
        setter,
        kind,
    })
}

fn property_is_injected(item_fn: &ImplItemFn) -> SynResult<bool> {
    let mut inject = false;
    for attr in item_fn.attrs.iter().filter(|a| a.meta.path().is_ident("property")) {
        match &attr.meta {
            Meta::Path(_) => {}
            Meta::List(list) => {
                let content = list.tokens.to_string();
                if content.trim() == "inject" {
                    inject = true;
                } else {
                    return Err(SynError::new(
                        list.tokens.span(),
                        "expects `#[property]` or `#[property(inject)]`",
                    ));
                }
            }
            Meta::NameValue(nv) => {
                return Err(SynError::new(
                    nv.span(),
                    "expects `#[property]` or `#[property(inject)]`",
                ));
            }
        }
    }
    Ok(inject)
}

fn arc_inner_type(ty: &Type) -> SynResult<Type> {
    let error = || SynError::new(ty.span(), "an injected property should take an `Arc<T>`");

    let Type::Path(path) = ty else {
        return Err(error());
    };
    let Some(last) = path.path.segments.last() else {
        return Err(error());
    };
    if last.ident != "Arc" {
        return Err(error());
    }
    let PathArguments::AngleBracketed(args) = &last.arguments else {
        return Err(error());
    };
    match args.args.first() {
        Some(GenericArgument::Type(inner)) if args.args.len() == 1 => Ok(inner.clone()),
        _ => Err(error()),
    }
}

fn expand_component_implementation(ctor_data: &ConstructorData) -> TokenStream2 {
    let self_type = &ctor_data.self_type;
    let constructor = &ctor_data.identifier;

    let associated_type_error =
        if let ReturnTypeData::Result { error_type } = &ctor_data.return_type {
            quote! { type Error = #error_type; }
        } else {
            quote! { type Error = std::convert::Infallible; }
        };

    let get_dep_statements = ctor_data
        .arguments
        .iter()
        .enumerate()
        .map(|(i, arg)| {
            let dep = Ident::new(&format!("dep{i}"), arg.span);
            if arg.collect {
                quote! { let #dep = injector.get_all()?; }
            } else {
                quote! { let #dep = injector.get()?; }
            }
        })
        .collect::<TokenStream2>();

    let dep_args = ctor_data
        .arguments
        .iter()
        .enumerate()
        .map(|(i, arg)| {
            let dep = Ident::new(&format!("dep{i}"), arg.span);
            quote! { #dep, }
        })
        .collect::<TokenStream2>();

    let wire_deps = if let ReturnTypeData::Infallible = &ctor_data.return_type {
        quote! { Ok(Ok(#self_type::#constructor(#dep_args))) }
    } else {
        quote! { Ok(#self_type::#constructor(#dep_args)) }
    };

    quote! {
        impl objbuilder::provider::Component for #self_type {
            #associated_type_error

            fn construct<I>(injector: &I) -> std::result::Result<
                std::result::Result<Self, Self::Error>,
                objbuilder::container::injector::InjectorError
            >
            where
                I: objbuilder::container::injector::TypedInjector + ?Sized
            {
                #get_dep_statements
                #wire_deps
            }
        }
    }
}

fn expand_descriptor_implementation(
    self_type: &TypePath,
    properties: &[PropertyData],
    attr_data: &AttributeData,
) -> TokenStream2 {
    let properties_fn = if properties.is_empty() {
        TokenStream2::new()
    } else {
        let properties = properties.iter().map(|property| {
            let PropertyData { name, setter, kind } = property;
            match kind {
                PropertyKind::Value(ty) => quote! {
                    objbuilder::provider::Property::value::<#ty>(#name, #self_type::#setter)
                },
                PropertyKind::Dependency(ty) => quote! {
                    objbuilder::provider::Property::dependency::<#ty>(#name, #self_type::#setter)
                },
            }
        });
        quote! {
            fn properties() -> std::vec::Vec<objbuilder::provider::Property<Self>> {
                std::vec![#(#properties),*]
            }
        }
    };

    let expose_fn = if attr_data.exposed.is_empty() {
        TokenStream2::new()
    } else {
        let exposed = &attr_data.exposed;
        quote! {
            fn expose(interfaces: &mut objbuilder::provider::Interfaces<Self>) {
                #(interfaces.expose::<#exposed>(|this| this);)*
            }
        }
    };

    let disposer_fn = if attr_data.dispose {
        quote! {
            fn disposer(
                this: &std::sync::Arc<Self>,
            ) -> std::option::Option<std::sync::Arc<dyn objbuilder::provider::Dispose>> {
                std::option::Option::Some(
                    std::sync::Arc::clone(this) as std::sync::Arc<dyn objbuilder::provider::Dispose>
                )
            }
        }
    } else {
        TokenStream2::new()
    };

    quote! {
        impl objbuilder::provider::Descriptor for #self_type {
            #properties_fn
            #expose_fn
            #disposer_fn
        }
    }
}
