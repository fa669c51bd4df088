//! Shared catalog and registry fixtures for the authority tests.
//!
//! Models a small CLR surface: `String`/`Number`/`Boolean`/`Char` facades,
//! a generic `Array<T>` with `map`, `List<T>`, `Console` with erased
//! overloads, a `Func<T, TResult>` delegate, `Dictionary<K, V>`, and a
//! source-origin `Point` interface.

#![allow(dead_code)]

use tsonic_authority::TypeAuthority;
use tsonic_catalog::{AliasTable, CatalogBuilder, CatalogParam, NominalCatalog, TypeParamDecl};
use tsonic_ir::{HandleRegistry, IrParameter, IrType, TypeId};

pub struct Fixture {
    pub registry: HandleRegistry,
    pub catalog: NominalCatalog,
    pub aliases: AliasTable,
    pub string: TypeId,
    pub number: TypeId,
    pub boolean: TypeId,
    pub char_ty: TypeId,
    pub int32: TypeId,
    pub ienumerable: TypeId,
    pub array: TypeId,
    pub list: TypeId,
    pub console: TypeId,
    pub func: TypeId,
    pub dictionary: TypeId,
    pub point: TypeId,
}

impl Fixture {
    pub fn new() -> Fixture {
        let mut b = CatalogBuilder::new();

        let string = b.class("String", Some("System.String"));
        b.alias_name("string", string);
        b.readonly_property(string, "length", IrType::primitive("number"));
        b.indexer(string, "System.Int32", IrType::primitive("char"));

        let number = b.class("Number", Some("System.Double"));
        b.alias_name("number", number);
        let boolean = b.class("Boolean", Some("System.Boolean"));
        b.alias_name("boolean", boolean);
        let char_ty = b.class("Char", Some("System.Char"));
        b.alias_name("char", char_ty);
        let int32 = b.class("Int32", Some("System.Int32"));
        b.alias_name("int", int32);

        let ienumerable =
            b.interface("IEnumerable", Some("System.Collections.Generic.IEnumerable`1"));
        b.type_params(ienumerable, &["T"]);
        b.method(ienumerable, "first", vec![], IrType::type_param("T"));

        let array = b.class("Array", Some("Tsonic.Runtime.Array`1"));
        b.type_params(array, &["T"]);
        b.extends(array, ienumerable, vec![IrType::type_param("T")]);
        b.readonly_property(array, "length", IrType::primitive("number"));
        b.indexer(array, "System.Int32", IrType::type_param("T"));
        b.generic_method(
            array,
            "map",
            vec![TypeParamDecl::new("U")],
            vec![CatalogParam::new(
                "selector",
                IrType::function(
                    vec![IrParameter::named("x", IrType::type_param("T"))],
                    IrType::type_param("U"),
                ),
            )],
            IrType::reference_to(array, "Array", vec![IrType::type_param("U")]),
        );

        let list = b.class("List", Some("System.Collections.Generic.List`1"));
        b.type_params(list, &["T"]);
        b.extends(list, ienumerable, vec![IrType::type_param("T")]);
        b.readonly_property(list, "count", IrType::primitive("int"));

        let console = b.class("Console", Some("System.Console"));
        b.method(
            console,
            "writeLine",
            vec![CatalogParam::new("value", IrType::primitive("char"))],
            IrType::Void,
        );
        b.method(
            console,
            "writeLine",
            vec![CatalogParam::new("value", IrType::primitive("string"))],
            IrType::Void,
        );
        b.method(
            console,
            "writeLine",
            vec![CatalogParam::new("value", IrType::primitive("boolean"))],
            IrType::Void,
        );

        let func = b.delegate("Func", Some("System.Func`2"));
        b.type_params(func, &["T", "TResult"]);
        b.method(
            func,
            "invoke",
            vec![CatalogParam::new("arg", IrType::type_param("T"))],
            IrType::type_param("TResult"),
        );

        let dictionary = b.class("Dictionary", Some("System.Collections.Generic.Dictionary`2"));
        b.type_params(dictionary, &["K", "V"]);
        b.indexer(dictionary, "System.String", IrType::type_param("V"));

        let point = b.interface("Point", None);
        b.property(point, "x", IrType::primitive("number"));
        b.property(point, "y", IrType::primitive("number"));

        b.type_alias(
            "StringList",
            IrType::reference_to(array, "Array", vec![IrType::primitive("string")]),
        );
        b.type_alias(
            "__TsonicExt_String",
            IrType::reference_to(string, "String", vec![]),
        );

        let (catalog, aliases) = b.finish();
        Fixture {
            registry: HandleRegistry::new(),
            catalog,
            aliases,
            string,
            number,
            boolean,
            char_ty,
            int32,
            ienumerable,
            array,
            list,
            console,
            func,
            dictionary,
            point,
        }
    }

    pub fn authority(&self) -> TypeAuthority<'_> {
        TypeAuthority::new(&self.registry, &self.catalog, &self.aliases)
    }

    /// Opt a test into trace output via `RUST_LOG`.
    pub fn trace_init() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .try_init();
    }

    /// `Array<element>` as the IR spells it.
    pub fn array_of(&self, element: IrType) -> IrType {
        IrType::reference_to(self.array, "Array", vec![element])
    }

    pub fn list_of(&self, element: IrType) -> IrType {
        IrType::reference_to(self.list, "List", vec![element])
    }
}
