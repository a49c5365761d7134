use crate::metadata::token::Token;

/// Represents a type inside a signature tree
///
/// Composite nodes own their children. Single-child nodes (pointers, arrays,
/// modifiers, ...) own exactly one boxed child, [`TypeSignature::GenericInst`]
/// owns the instantiated generic type plus its ordered argument list.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum TypeSignature {
    #[default]
    /// Not defined
    Unknown,
    /// void
    Void,
    /// bool
    Boolean,
    /// char
    Char,
    /// signed 8bit integer
    I1,
    /// unsigned 8bit integer
    U1,
    /// signed 16bit integer
    I2,
    /// unsigned 16bit integer
    U2,
    /// signed 32bit integer
    I4,
    /// unsigned 32bit integer
    U4,
    /// signed 64bit integer
    I8,
    /// unsigned 64bit integer
    U8,
    /// 32bit floating-point
    R4,
    /// 64bit floating-point
    R8,
    /// signed integer, sized to executing platform
    I,
    /// unsigned integer, sized to executing platform
    U,
    /// System.String
    String,
    /// System.Object
    Object,
    /// Type is referenced during runtime
    TypedByRef,
    /// CIL value-type
    // TypeDefOrRefOrSpecEncoded
    ValueType(Token),
    /// CIL Class
    // TypeDefOrRefOrSpecEncoded
    Class(Token),
    /// A pointer to a type
    Ptr(Box<TypeSignature>),
    /// Type by reference
    ByRef(Box<TypeSignature>),
    /// A pinned type
    Pinned(Box<TypeSignature>),
    /// Single dimension, zero based array
    SzArray(Box<TypeSignature>),
    /// Fixed size value array
    ValueArray(SignatureValueArray),
    /// Multi dimensional array
    Array(SignatureArray),
    /// Type qualified by a module index
    Module(SignatureModule),
    /// Required modifier
    ModifiedRequired(SignatureModifier),
    /// Optional modifier
    ModifiedOptional(SignatureModifier),
    /// Generic type parameter
    // Index into the generic arguments of the declaring type
    GenericParamType(u32),
    /// Generic method parameter
    // Index into the generic arguments of the declaring method
    GenericParamMethod(u32),
    /// Generic type and its arguments
    GenericInst(Box<TypeSignature>, Vec<TypeSignature>),
    /// Function pointer
    FnPtr(Box<SignatureMethod>),
}

/// A multi dimensional array
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SignatureArray {
    /// The type in the array
    pub base: Box<TypeSignature>,
    /// The number of dimensions
    pub rank: u32,
    /// The declared sizes (can be less than 'rank', are in order from 0..count)
    pub sizes: Vec<u32>,
    /// The declared lower bounds (can be less than 'rank')
    pub lower_bounds: Vec<i32>,
}

/// A fixed size value array
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SignatureValueArray {
    /// The type in the array
    pub base: Box<TypeSignature>,
    /// The number of elements
    pub size: u32,
}

/// A type qualified by a module
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SignatureModule {
    /// Index of the module the type lives in
    pub index: u32,
    /// The qualified type
    pub base: Box<TypeSignature>,
}

/// A custom modifier applied to a type
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SignatureModifier {
    /// Token to TypeDef | TypeRef of the modifier
    pub modifier: Token,
    /// The modified type
    pub base: Box<TypeSignature>,
}

/// Parameter with optional custom modifiers
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SignatureParameter {
    /// Custom modifiers of the parameter - `TypeDefOrRefOrSpecEncoded`
    pub modifiers: Vec<Token>,
    /// Parameter is passed by reference
    pub by_ref: bool,
    /// The type of the parameter
    pub base: TypeSignature,
}

impl SignatureParameter {
    /// Creates a plain parameter without modifiers
    #[must_use]
    pub fn new(base: TypeSignature) -> Self {
        SignatureParameter {
            modifiers: Vec::new(),
            by_ref: false,
            base,
        }
    }
}

/// Represents a method signature (II.23.2.1)
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[allow(clippy::struct_excessive_bools)]
pub struct SignatureMethod {
    /// Used to encode the keyword instance in the calling convention, see §II.15.3
    pub has_this: bool,
    /// Used to encode the keyword explicit in the calling convention, see §II.15.3
    pub explicit_this: bool,
    /// Used to encode the keyword default in the calling convention, see §II.15.3
    pub default: bool,
    /// Used to encode the keyword vararg in the calling convention, see §II.15.3
    pub vararg: bool,
    /// Uses native 'cdelc' calling convention
    pub cdecl: bool,
    /// Uses native 'stdcall' calling convention
    pub stdcall: bool,
    /// Uses native 'thiscall' calling convention
    pub thiscall: bool,
    /// Uses native 'fastcall' calling convention
    pub fastcall: bool,
    /// Number of generic parameters declared by the method
    pub param_count_generic: u32,
    /// Used to indicate the number of `Param` this `Method` has
    pub param_count: u32,
    /// The return type of this `Method`
    pub return_type: SignatureParameter,
    /// The parameters of this `Method`
    pub params: Vec<SignatureParameter>,
    /// The parameters following the vararg sentinel, `None` if there is no sentinel
    pub varargs: Option<Vec<SignatureParameter>>,
}

impl SignatureMethod {
    /// Copies the calling convention and generic parameter count into an
    /// otherwise empty signature
    #[must_use]
    pub fn with_same_convention(&self) -> Self {
        SignatureMethod {
            has_this: self.has_this,
            explicit_this: self.explicit_this,
            default: self.default,
            vararg: self.vararg,
            cdecl: self.cdecl,
            stdcall: self.stdcall,
            thiscall: self.thiscall,
            fastcall: self.fastcall,
            param_count_generic: self.param_count_generic,
            param_count: self.param_count,
            return_type: SignatureParameter::default(),
            params: Vec::with_capacity(self.params.len()),
            varargs: None,
        }
    }
}

impl TypeSignature {
    /// Wraps `inner` into a pointer
    #[must_use]
    pub fn ptr(inner: TypeSignature) -> Self {
        TypeSignature::Ptr(Box::new(inner))
    }

    /// Wraps `inner` into a by-ref
    #[must_use]
    pub fn by_ref(inner: TypeSignature) -> Self {
        TypeSignature::ByRef(Box::new(inner))
    }

    /// Wraps `inner` into a single dimension array
    #[must_use]
    pub fn sz_array(inner: TypeSignature) -> Self {
        TypeSignature::SzArray(Box::new(inner))
    }

    /// Creates a generic instantiation of `generic` with `args`
    #[must_use]
    pub fn generic_inst(generic: TypeSignature, args: Vec<TypeSignature>) -> Self {
        TypeSignature::GenericInst(Box::new(generic), args)
    }

    /// Returns the single child of this node, if it is a single-child node
    #[must_use]
    pub fn next(&self) -> Option<&TypeSignature> {
        match self {
            TypeSignature::Ptr(base)
            | TypeSignature::ByRef(base)
            | TypeSignature::Pinned(base)
            | TypeSignature::SzArray(base) => Some(&**base),
            TypeSignature::ValueArray(array) => Some(&array.base),
            TypeSignature::Array(array) => Some(&array.base),
            TypeSignature::Module(module) => Some(&module.base),
            TypeSignature::ModifiedRequired(modifier)
            | TypeSignature::ModifiedOptional(modifier) => Some(&modifier.base),
            _ => None,
        }
    }

    /// Returns true for class and value-type references
    ///
    /// These are the only nodes allowed in the generic type position of a
    /// [`TypeSignature::GenericInst`].
    #[must_use]
    pub fn is_class_or_value_type(&self) -> bool {
        matches!(self, TypeSignature::Class(_) | TypeSignature::ValueType(_))
    }

    /// Returns true if a generic type or method parameter appears anywhere in the tree
    ///
    /// Walks the tree with an explicit work list, so arbitrarily deep trees do
    /// not exhaust the stack. Function pointer signatures are inspected too.
    #[must_use]
    pub fn contains_generic_params(&self) -> bool {
        let mut pending = vec![self];

        while let Some(current) = pending.pop() {
            match current {
                TypeSignature::GenericParamType(_) | TypeSignature::GenericParamMethod(_) => {
                    return true
                }
                TypeSignature::GenericInst(generic, args) => {
                    pending.push(generic);
                    pending.extend(args.iter());
                }
                TypeSignature::FnPtr(method) => {
                    pending.push(&method.return_type.base);
                    pending.extend(method.params.iter().map(|param| &param.base));
                    if let Some(varargs) = &method.varargs {
                        pending.extend(varargs.iter().map(|param| &param.base));
                    }
                }
                other => {
                    if let Some(next) = other.next() {
                        pending.push(next);
                    }
                }
            }
        }

        false
    }
}
