use anyhow::Result;
use dl_ast::DecoratorSyntax;
use swc_common::{
    comments::SingleThreadedComments, errors::Handler, sync::Lrc, FileName, SourceMap,
};
use swc_ecma_ast::EsVersion;
use swc_ecma_parser::{Syntax, TsSyntax};

use crate::preprocess;

/// Result of parsing a decorated source file.
pub struct ParseResult {
    pub module: swc_ecma_ast::Module,
    pub comments: SingleThreadedComments,
    pub source_map: Lrc<SourceMap>,
    /// The preprocessed source (after marker rewrites, before SWC parsing).
    pub preprocessed_source: String,
}

/// Parse a TypeScript/TSX source string with decorators enabled.
///
/// 1. Preprocess: encode object member decorators as marker properties.
/// 2. Parse: feed the preprocessed text to the standard SWC parser.
pub fn parse_decorated(
    source: &str,
    filename: &str,
    syntax: &DecoratorSyntax,
) -> Result<ParseResult> {
    let preprocessed = preprocess::preprocess(source, syntax);

    let source_map: Lrc<SourceMap> = Default::default();
    let source_file = source_map.new_source_file(
        Lrc::new(FileName::Custom(filename.to_string())),
        preprocessed.clone(),
    );

    let comments = SingleThreadedComments::default();

    let handler = Handler::with_emitter_writer(Box::new(std::io::stderr()), Some(source_map.clone()));

    let is_tsx = filename.ends_with(".tsx");
    let ts_syntax = Syntax::Typescript(TsSyntax {
        tsx: is_tsx,
        decorators: true,
        ..Default::default()
    });

    let mut recovered = vec![];
    let module = swc_ecma_parser::parse_file_as_module(
        &source_file,
        ts_syntax,
        EsVersion::latest(),
        Some(&comments),
        &mut recovered,
    )
    .map_err(|e| {
        e.into_diagnostic(&handler).emit();
        anyhow::anyhow!("failed to parse {filename}")
    })?;

    if !recovered.is_empty() {
        let count = recovered.len();
        for e in recovered {
            e.into_diagnostic(&handler).emit();
        }
        anyhow::bail!("failed to parse {filename}: {count} syntax error(s)");
    }

    tracing::debug!(filename, items = module.body.len(), "parsed module");

    Ok(ParseResult {
        module,
        comments,
        source_map,
        preprocessed_source: preprocessed,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use swc_ecma_ast::{ClassMember, Decl, ModuleItem, Stmt};

    #[test]
    fn class_member_decorators_parse_natively() {
        let parsed = parse_decorated(
            "@a class C { @b m() {} @c p = 1; }",
            "t.ts",
            &DecoratorSyntax::default(),
        )
        .unwrap();
        let ModuleItem::Stmt(Stmt::Decl(Decl::Class(decl))) = &parsed.module.body[0] else {
            panic!("expected a class declaration");
        };
        assert_eq!(decl.class.decorators.len(), 1);
        let ClassMember::Method(method) = &decl.class.body[0] else {
            panic!("expected a method");
        };
        assert_eq!(method.function.decorators.len(), 1);
        let ClassMember::ClassProp(prop) = &decl.class.body[1] else {
            panic!("expected a class property");
        };
        assert_eq!(prop.decorators.len(), 1);
    }

    #[test]
    fn object_member_decorators_become_markers() {
        let parsed = parse_decorated(
            "const o = { @dec k: 1 };",
            "t.ts",
            &DecoratorSyntax::default(),
        )
        .unwrap();
        assert!(parsed
            .preprocessed_source
            .contains("__legacy_decorators__: [dec],"));
    }

    #[test]
    fn object_member_decorators_fail_when_disabled() {
        let syntax = DecoratorSyntax {
            object_members: false,
        };
        assert!(parse_decorated("const o = { @dec k: 1 };", "t.ts", &syntax).is_err());
    }
}
