//! Declaration-level view of a Rust source file.
//!
//! # Responsibilities
//! - Parse a file into a syntax tree with `syn`
//! - Find method-like declarations (free fns, impl methods, trait methods)
//! - Attach each declaration's documentation lines with their source line

use syn::spanned::Spanned;
use syn::{Attribute, Expr, ExprLit, ImplItem, Item, Lit, Meta, TraitItem};

/// One line of a documentation block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocLine {
    pub text: String,
    /// 1-based line in the source file, 0 when unknown.
    pub line: usize,
}

/// A method-like declaration and the documentation attached to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    pub name: String,
    pub docs: Vec<DocLine>,
}

/// Parse `source` and return its documented method-like declarations, in
/// source order.
pub fn parse_declarations(source: &str) -> syn::Result<Vec<Declaration>> {
    let file = syn::parse_file(source)?;
    let mut declarations = Vec::new();
    collect_items(&file.items, &mut declarations);
    Ok(declarations)
}

fn collect_items(items: &[Item], out: &mut Vec<Declaration>) {
    for item in items {
        match item {
            Item::Fn(f) => push_declaration(&f.attrs, &f.sig.ident, out),
            Item::Impl(imp) => {
                for impl_item in &imp.items {
                    if let ImplItem::Fn(m) = impl_item {
                        push_declaration(&m.attrs, &m.sig.ident, out);
                    }
                }
            }
            Item::Trait(tr) => {
                for trait_item in &tr.items {
                    if let TraitItem::Fn(m) = trait_item {
                        push_declaration(&m.attrs, &m.sig.ident, out);
                    }
                }
            }
            Item::Mod(m) => {
                if let Some((_, items)) = &m.content {
                    collect_items(items, out);
                }
            }
            _ => {}
        }
    }
}

fn push_declaration(attrs: &[Attribute], ident: &syn::Ident, out: &mut Vec<Declaration>) {
    let docs = doc_lines(attrs);
    if docs.is_empty() {
        return;
    }
    out.push(Declaration {
        name: ident.to_string(),
        docs,
    });
}

fn doc_lines(attrs: &[Attribute]) -> Vec<DocLine> {
    let mut lines = Vec::new();
    for attr in attrs {
        if !attr.path().is_ident("doc") {
            continue;
        }
        let Meta::NameValue(nv) = &attr.meta else {
            continue;
        };
        let Expr::Lit(ExprLit {
            lit: Lit::Str(text), ..
        }) = &nv.value
        else {
            continue;
        };

        let first_line = attr.span().start().line;
        for (offset, text) in text.value().lines().enumerate() {
            lines.push(DocLine {
                text: text.to_string(),
                line: if first_line == 0 { 0 } else { first_line + offset },
            });
        }
    }
    lines
}
