use proc_macro::TokenStream;
use syn::parse::{Parse, ParseStream, Parser};
use syn::punctuated::Punctuated;
use syn::{Expr, Result as SynResult, Token, Type};

#[derive(Debug)]
pub struct AttributeData {
    pub supertypes: Vec<SupertypeData>,
}

#[derive(Debug)]
pub struct SupertypeData {
    pub target: Type,
    pub upcast: Expr,
}

impl Parse for SupertypeData {
    fn parse(input: ParseStream) -> SynResult<Self> {
        let target = input.parse()?;
        input.parse::<Token![=>]>()?;
        let upcast = input.parse()?;
        Ok(Self { target, upcast })
    }
}

pub fn parse_attributes(attr: TokenStream) -> SynResult<AttributeData> {
    let parser = Punctuated::<SupertypeData, Token![,]>::parse_terminated;
    let supertypes = parser.parse(attr)?.into_iter().collect();
    Ok(AttributeData { supertypes })
}
