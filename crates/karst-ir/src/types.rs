//! Static types and the representation classifier.
//!
//! The runtime has two physical encodings: a compact unboxed form for the
//! primitive-like value kinds below, and a uniform heap-object form for
//! everything else. The classifier answers, for a static type, which
//! encoding a value of that type uses.
//!
//! | Kind      | Type name   | Boxed counterpart | Unboxed `null`? |
//! |-----------|-------------|-------------------|-----------------|
//! | Boolean   | `Boolean`   | `BooleanBox`      | no              |
//! | Char      | `Char`      | `CharBox`         | no              |
//! | Byte      | `Byte`      | `ByteBox`         | no              |
//! | Short     | `Short`     | `ShortBox`        | no              |
//! | Int       | `Int`       | `IntBox`          | no              |
//! | Long      | `Long`      | `LongBox`         | no              |
//! | Float     | `Float`     | `FloatBox`        | no              |
//! | Double    | `Double`    | `DoubleBox`       | no              |
//! | NativePtr | `NativePtr` | `NativePtrBox`    | yes             |
//! | CPointer  | `CPointer`  | `CPointerBox`     | yes             |
//!
//! Pointer kinds have a spare bit pattern for `null`, so nullable pointer
//! types stay unboxed; a nullable type of any other kind falls back to the
//! boxed encoding.

use crate::Symbol;

crate::symbols! {
    TYPE_ANY => "Any",
    TYPE_UNIT => "Unit",
    TYPE_NOTHING => "Nothing",
}

/// Primitive-like value kinds with a compact unboxed encoding.
///
/// Fixed at compiler bootstrap. Each kind owns exactly one nominal type
/// name and one boxed counterpart type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, salsa::Update)]
pub enum ValueKind {
    Boolean,
    Char,
    Byte,
    Short,
    Int,
    Long,
    Float,
    Double,
    /// The runtime's raw pointer word.
    NativePtr,
    /// Foreign (interop) pointer word.
    CPointer,
}

impl ValueKind {
    pub const ALL: [ValueKind; 10] = [
        ValueKind::Boolean,
        ValueKind::Char,
        ValueKind::Byte,
        ValueKind::Short,
        ValueKind::Int,
        ValueKind::Long,
        ValueKind::Float,
        ValueKind::Double,
        ValueKind::NativePtr,
        ValueKind::CPointer,
    ];

    /// The nominal type name using this kind's unboxed encoding.
    pub fn type_name(self) -> Symbol {
        Symbol::new(match self {
            ValueKind::Boolean => "Boolean",
            ValueKind::Char => "Char",
            ValueKind::Byte => "Byte",
            ValueKind::Short => "Short",
            ValueKind::Int => "Int",
            ValueKind::Long => "Long",
            ValueKind::Float => "Float",
            ValueKind::Double => "Double",
            ValueKind::NativePtr => "NativePtr",
            ValueKind::CPointer => "CPointer",
        })
    }

    /// Name of the heap type wrapping one value of this kind.
    /// Derived as `<TypeName>Box`.
    pub fn box_name(self) -> Symbol {
        Symbol::new(match self {
            ValueKind::Boolean => "BooleanBox",
            ValueKind::Char => "CharBox",
            ValueKind::Byte => "ByteBox",
            ValueKind::Short => "ShortBox",
            ValueKind::Int => "IntBox",
            ValueKind::Long => "LongBox",
            ValueKind::Float => "FloatBox",
            ValueKind::Double => "DoubleBox",
            ValueKind::NativePtr => "NativePtrBox",
            ValueKind::CPointer => "CPointerBox",
        })
    }

    /// Lower-case stem used in runtime primitive names (`box_int`, ...).
    pub fn primitive_stem(self) -> &'static str {
        match self {
            ValueKind::Boolean => "boolean",
            ValueKind::Char => "char",
            ValueKind::Byte => "byte",
            ValueKind::Short => "short",
            ValueKind::Int => "int",
            ValueKind::Long => "long",
            ValueKind::Float => "float",
            ValueKind::Double => "double",
            ValueKind::NativePtr => "native_ptr",
            ValueKind::CPointer => "c_pointer",
        }
    }

    /// Whether the unboxed encoding has a spare bit pattern for `null`.
    pub fn admits_null(self) -> bool {
        matches!(self, ValueKind::NativePtr | ValueKind::CPointer)
    }

    /// Foreign-pointer kinds get the interop null sentinel instead of a
    /// typed null constant.
    pub fn is_foreign_pointer(self) -> bool {
        matches!(self, ValueKind::CPointer)
    }
}

/// A static type: nominal identity plus nullability.
#[salsa::interned(debug)]
pub struct Type<'db> {
    pub name: Symbol,
    pub nullable: bool,
}

impl<'db> Type<'db> {
    /// Non-nullable nominal type.
    pub fn named(db: &'db dyn salsa::Database, name: Symbol) -> Self {
        Type::new(db, name, false)
    }

    /// The non-nullable type using `kind`'s unboxed encoding.
    pub fn of_kind(db: &'db dyn salsa::Database, kind: ValueKind) -> Self {
        Type::new(db, kind.type_name(), false)
    }

    /// Top of the reference hierarchy.
    pub fn any(db: &'db dyn salsa::Database) -> Self {
        Type::named(db, TYPE_ANY())
    }

    /// The universal reference type: every value, boxed if necessary, can
    /// flow through it.
    pub fn nullable_any(db: &'db dyn salsa::Database) -> Self {
        Type::new(db, TYPE_ANY(), true)
    }

    pub fn unit(db: &'db dyn salsa::Database) -> Self {
        Type::named(db, TYPE_UNIT())
    }

    /// Bottom type; the static type of return expressions.
    pub fn nothing(db: &'db dyn salsa::Database) -> Self {
        Type::named(db, TYPE_NOTHING())
    }

    pub fn with_nullability(self, db: &'db dyn salsa::Database, nullable: bool) -> Self {
        if self.nullable(db) == nullable {
            self
        } else {
            Type::new(db, self.name(db), nullable)
        }
    }

    pub fn make_nullable(self, db: &'db dyn salsa::Database) -> Self {
        self.with_nullability(db, true)
    }

    /// Render as `Name` or `Name?` for messages and the printer.
    pub fn render(self, db: &'db dyn salsa::Database) -> String {
        let name = self.name(db);
        if self.nullable(db) {
            format!("{name}?")
        } else {
            name.to_string()
        }
    }
}

/// True iff `ty` statically uses `kind`'s unboxed encoding.
///
/// Nullability participates: only kinds that admit an unboxed `null` keep
/// their encoding when the type is nullable.
pub fn is_represented_as<'db>(
    db: &'db dyn salsa::Database,
    ty: Type<'db>,
    kind: ValueKind,
) -> bool {
    ty.name(db) == kind.type_name() && (!ty.nullable(db) || kind.admits_null())
}

/// Like [`is_represented_as`] with nullability ignored. Runtime check types
/// derive from this relation: a test against `Int?` still checks the boxed
/// class.
pub fn not_nullable_is_represented_as<'db>(
    db: &'db dyn salsa::Database,
    ty: Type<'db>,
    kind: ValueKind,
) -> bool {
    ty.name(db) == kind.type_name()
}

/// The unique kind whose unboxed encoding `ty` uses, or `None` when `ty` is
/// reference-represented.
///
/// Scans every kind instead of short-circuiting; a type claiming two kinds
/// means the kind table itself is broken and trips the assertion.
pub fn kind_of<'db>(db: &'db dyn salsa::Database, ty: Type<'db>) -> Option<ValueKind> {
    let mut found = None;
    for kind in ValueKind::ALL {
        if is_represented_as(db, ty, kind) {
            assert!(
                found.is_none(),
                "type {} classified as both {:?} and {:?}",
                ty.render(db),
                found.unwrap(),
                kind,
            );
            found = Some(kind);
        }
    }
    found
}

/// The heap type wrapping one unboxed value of `kind`. Total and injective.
pub fn boxed_type_of<'db>(db: &'db dyn salsa::Database, kind: ValueKind) -> Type<'db> {
    Type::named(db, kind.box_name())
}

/// The type a runtime type test checks against: the boxed counterpart with
/// `ty`'s own nullability for kind-named types, `ty` itself for anything
/// already reference-represented.
pub fn runtime_check_type<'db>(db: &'db dyn salsa::Database, ty: Type<'db>) -> Type<'db> {
    for kind in ValueKind::ALL {
        if not_nullable_is_represented_as(db, ty, kind) {
            return boxed_type_of(db, kind).with_nullability(db, ty.nullable(db));
        }
    }
    ty
}
