use anyhow::{Context, Result};
use syn::spanned::Spanned;
use syn::{ImplItem, Item, TraitItem, Type};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolKind {
    Function,
    Method,
    Module,
    Class,
    Interface,
}

/// A named region of a document, 1-based inclusive lines.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentSymbol {
    pub name: String,
    pub kind: SymbolKind,
    pub start_line: usize,
    pub end_line: usize,
    pub children: Vec<DocumentSymbol>,
}

impl DocumentSymbol {
    pub fn contains(&self, line: usize) -> bool {
        self.start_line <= line && line <= self.end_line
    }

    fn is_callable(&self) -> bool {
        matches!(self.kind, SymbolKind::Function | SymbolKind::Method)
    }
}

/// Outline of a source document.
pub trait SymbolProvider {
    fn document_symbols(&self, source: &str) -> Result<Vec<DocumentSymbol>>;
}

/// Returns the provider able to outline `path`, if its language is known.
pub fn symbol_provider_for(path: &std::path::Path) -> Option<Box<dyn SymbolProvider>> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("rs") => Some(Box::new(RustSymbolProvider)),
        _ => None,
    }
}

/// First function or method containing `line`, searching depth first. A
/// callable is returned before its own children are looked at.
pub fn find_containing_function(
    symbols: &[DocumentSymbol],
    line: usize,
) -> Option<&DocumentSymbol> {
    for symbol in symbols {
        if symbol.is_callable() && symbol.contains(line) {
            return Some(symbol);
        }
        if let Some(found) = find_containing_function(&symbol.children, line) {
            return Some(found);
        }
    }
    None
}

pub struct RustSymbolProvider;

impl SymbolProvider for RustSymbolProvider {
    fn document_symbols(&self, source: &str) -> Result<Vec<DocumentSymbol>> {
        let file = syn::parse_file(source).context("failed to parse source file")?;
        Ok(file.items.iter().filter_map(item_symbol).collect())
    }
}

fn item_symbol(item: &Item) -> Option<DocumentSymbol> {
    match item {
        Item::Fn(func) => Some(symbol(
            func.sig.ident.to_string(),
            SymbolKind::Function,
            item,
            Vec::new(),
        )),
        Item::Impl(impl_block) => {
            let children = impl_block
                .items
                .iter()
                .filter_map(|impl_item| match impl_item {
                    ImplItem::Fn(method) => Some(symbol(
                        method.sig.ident.to_string(),
                        SymbolKind::Method,
                        impl_item,
                        Vec::new(),
                    )),
                    _ => None,
                })
                .collect();
            Some(symbol(
                type_name(&impl_block.self_ty),
                SymbolKind::Class,
                item,
                children,
            ))
        }
        Item::Trait(trait_block) => {
            let children = trait_block
                .items
                .iter()
                .filter_map(|trait_item| match trait_item {
                    TraitItem::Fn(method) if method.default.is_some() => Some(symbol(
                        method.sig.ident.to_string(),
                        SymbolKind::Method,
                        trait_item,
                        Vec::new(),
                    )),
                    _ => None,
                })
                .collect();
            Some(symbol(
                trait_block.ident.to_string(),
                SymbolKind::Interface,
                item,
                children,
            ))
        }
        Item::Mod(module) => {
            let (_, items) = module.content.as_ref()?;
            Some(symbol(
                module.ident.to_string(),
                SymbolKind::Module,
                item,
                items.iter().filter_map(item_symbol).collect(),
            ))
        }
        _ => None,
    }
}

fn symbol(
    name: String,
    kind: SymbolKind,
    node: &impl Spanned,
    children: Vec<DocumentSymbol>,
) -> DocumentSymbol {
    let span = node.span();
    DocumentSymbol {
        name,
        kind,
        start_line: span.start().line,
        end_line: span.end().line,
        children,
    }
}

fn type_name(ty: &Type) -> String {
    match ty {
        Type::Path(type_path) => type_path
            .path
            .segments
            .last()
            .map(|segment| segment.ident.to_string())
            .unwrap_or_default(),
        _ => "impl".to_string(),
    }
}
