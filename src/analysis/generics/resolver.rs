//! Recursive substitution of generic arguments inside signature trees.

use std::borrow::Cow;

use tracing::{debug, trace, warn};

use crate::{
    analysis::generics::{GenericArguments, RecursionGuard},
    config::ResolverConfig,
    metadata::signatures::{
        SignatureArray, SignatureMethod, SignatureModifier, SignatureModule, SignatureParameter,
        SignatureValueArray, TypeSignature,
    },
    Error::{self, InvalidInput, NotSupported},
    Result,
};

/// Substitutes concrete types for generic parameters in signature trees
///
/// The resolver walks a tree top-down. At every node it first asks the
/// [`GenericArguments`] whether the whole node is to be replaced; a
/// replacement is taken as-is and not descended into. Otherwise the node is
/// rebuilt around its resolved children with every other attribute carried
/// over verbatim. Subtrees without anything to substitute are not copied:
/// they come back as [`Cow::Borrowed`] from the input tree.
///
/// Each top-level call owns a fresh [`RecursionGuard`], so resolving is
/// referentially transparent and a resolver can be shared between threads.
///
/// # Examples
///
/// ```rust
/// use dotshield::analysis::generics::GenericArgumentResolver;
/// use dotshield::metadata::signatures::TypeSignature;
///
/// let type_args = [TypeSignature::I4];
/// let resolver = GenericArgumentResolver::new(&type_args);
///
/// let sig = TypeSignature::ptr(TypeSignature::GenericParamType(0));
/// let resolved = resolver.resolve_type(&sig)?;
/// assert_eq!(*resolved, TypeSignature::ptr(TypeSignature::I4));
/// # Ok::<(), dotshield::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct GenericArgumentResolver<'a> {
    arguments: GenericArguments<'a>,
    config: ResolverConfig,
}

impl<'a> GenericArgumentResolver<'a> {
    /// Create a new resolver binding the type parameters to `type_args`
    ///
    /// ## Arguments
    /// * 'type_args' - The generic arguments of the declaring type, may be empty
    #[must_use]
    pub fn new(type_args: &'a [TypeSignature]) -> Self {
        let mut arguments = GenericArguments::new();
        arguments.push_type_args(type_args);

        GenericArgumentResolver {
            arguments,
            config: ResolverConfig::default(),
        }
    }

    /// Additionally bind the method parameters to `method_args`
    ///
    /// ## Arguments
    /// * 'method_args' - The generic arguments of the declaring method
    #[must_use]
    pub fn with_method_args(mut self, method_args: &'a [TypeSignature]) -> Self {
        self.arguments.push_method_args(method_args);
        self
    }

    /// Use a non-default configuration
    ///
    /// ## Arguments
    /// * 'config' - The configuration to apply
    #[must_use]
    pub fn with_config(mut self, config: ResolverConfig) -> Self {
        self.config = config;
        self
    }

    /// The argument frames used for substitution
    #[must_use]
    pub fn arguments(&self) -> &GenericArguments<'a> {
        &self.arguments
    }

    /// Mutable access to the argument frames, to push or pop nested contexts
    pub fn arguments_mut(&mut self) -> &mut GenericArguments<'a> {
        &mut self.arguments
    }

    /// Resolve a type signature
    ///
    /// ## Arguments
    /// * 'sig' - The signature to resolve
    ///
    /// # Errors
    /// Returns an error if:
    /// - `sig` is [`TypeSignature::Unknown`] (no work is performed)
    /// - The tree is nested deeper than the configured maximum depth
    /// - The tree contains a function pointer
    /// - A generic instantiation is not over a class or value type
    pub fn resolve_type<'s>(&self, sig: &'s TypeSignature) -> Result<Cow<'s, TypeSignature>> {
        if matches!(sig, TypeSignature::Unknown) {
            return Err(InvalidInput("type signature is undefined".to_string()));
        }

        let mut guard = RecursionGuard::new(self.config.max_depth);
        self.resolve_with_guard(sig, &mut guard)
            .inspect_err(|error| Self::report(error))
    }

    /// Resolve a method signature into a newly built one
    ///
    /// The calling convention and the parameter counts are copied, the return
    /// type, all parameters and the vararg tail (if the signature has a
    /// sentinel) are resolved in order. Parameter modifiers and by-ref flags
    /// are preserved.
    ///
    /// ## Arguments
    /// * 'sig' - The method signature to resolve
    ///
    /// # Errors
    /// Returns an error if the return type is [`TypeSignature::Unknown`] or any
    /// contained type fails to resolve, see [`GenericArgumentResolver::resolve_type`].
    pub fn resolve_method(&self, sig: &SignatureMethod) -> Result<SignatureMethod> {
        if matches!(sig.return_type.base, TypeSignature::Unknown) {
            return Err(InvalidInput(
                "method signature has no return type".to_string(),
            ));
        }

        let mut guard = RecursionGuard::new(self.config.max_depth);
        self.resolve_method_with_guard(sig, &mut guard)
            .inspect_err(|error| Self::report(error))
    }

    fn resolve_method_with_guard(
        &self,
        sig: &SignatureMethod,
        guard: &mut RecursionGuard,
    ) -> Result<SignatureMethod> {
        let mut scope = guard.enter()?;

        let mut resolved = sig.with_same_convention();
        resolved.return_type = self.resolve_parameter(&sig.return_type, &mut scope)?;
        for param in &sig.params {
            resolved
                .params
                .push(self.resolve_parameter(param, &mut scope)?);
        }

        if let Some(varargs) = &sig.varargs {
            let tail = varargs
                .iter()
                .map(|param| self.resolve_parameter(param, &mut scope))
                .collect::<Result<Vec<_>>>()?;
            resolved.varargs = Some(tail);
        }

        Ok(resolved)
    }

    fn resolve_parameter(
        &self,
        param: &SignatureParameter,
        guard: &mut RecursionGuard,
    ) -> Result<SignatureParameter> {
        Ok(SignatureParameter {
            modifiers: param.modifiers.clone(),
            by_ref: param.by_ref,
            base: self.resolve_with_guard(&param.base, guard)?.into_owned(),
        })
    }

    fn resolve_with_guard<'s>(
        &self,
        sig: &'s TypeSignature,
        guard: &mut RecursionGuard,
    ) -> Result<Cow<'s, TypeSignature>> {
        let mut scope = guard.enter()?;

        if let Some(substitute) = self.arguments.resolve(sig) {
            trace!(?sig, ?substitute, "substituted generic parameter");
            return Ok(Cow::Owned(substitute.clone()));
        }

        let resolved = match sig {
            TypeSignature::Unknown
            | TypeSignature::Void
            | TypeSignature::Boolean
            | TypeSignature::Char
            | TypeSignature::I1
            | TypeSignature::U1
            | TypeSignature::I2
            | TypeSignature::U2
            | TypeSignature::I4
            | TypeSignature::U4
            | TypeSignature::I8
            | TypeSignature::U8
            | TypeSignature::R4
            | TypeSignature::R8
            | TypeSignature::I
            | TypeSignature::U
            | TypeSignature::String
            | TypeSignature::Object
            | TypeSignature::TypedByRef
            | TypeSignature::ValueType(_)
            | TypeSignature::Class(_) => Cow::Borrowed(sig),
            // Unbound, belongs to an enclosing generic context
            TypeSignature::GenericParamType(_) | TypeSignature::GenericParamMethod(_) => {
                Cow::Borrowed(sig)
            }
            TypeSignature::Ptr(base) => self.rebuild(sig, base, &mut scope, TypeSignature::Ptr)?,
            TypeSignature::ByRef(base) => {
                self.rebuild(sig, base, &mut scope, TypeSignature::ByRef)?
            }
            TypeSignature::Pinned(base) => {
                self.rebuild(sig, base, &mut scope, TypeSignature::Pinned)?
            }
            TypeSignature::SzArray(base) => {
                self.rebuild(sig, base, &mut scope, TypeSignature::SzArray)?
            }
            TypeSignature::ValueArray(array) => {
                self.rebuild(sig, &array.base, &mut scope, |base| {
                    TypeSignature::ValueArray(SignatureValueArray {
                        base,
                        size: array.size,
                    })
                })?
            }
            TypeSignature::Array(array) => self.rebuild(sig, &array.base, &mut scope, |base| {
                TypeSignature::Array(SignatureArray {
                    base,
                    rank: array.rank,
                    sizes: array.sizes.clone(),
                    lower_bounds: array.lower_bounds.clone(),
                })
            })?,
            TypeSignature::Module(module) => {
                self.rebuild(sig, &module.base, &mut scope, |base| {
                    TypeSignature::Module(SignatureModule {
                        index: module.index,
                        base,
                    })
                })?
            }
            TypeSignature::ModifiedRequired(modifier) => {
                self.rebuild(sig, &modifier.base, &mut scope, |base| {
                    TypeSignature::ModifiedRequired(SignatureModifier {
                        modifier: modifier.modifier,
                        base,
                    })
                })?
            }
            TypeSignature::ModifiedOptional(modifier) => {
                self.rebuild(sig, &modifier.base, &mut scope, |base| {
                    TypeSignature::ModifiedOptional(SignatureModifier {
                        modifier: modifier.modifier,
                        base,
                    })
                })?
            }
            TypeSignature::GenericInst(generic, args) => {
                self.resolve_generic_inst(sig, generic, args, &mut scope)?
            }
            TypeSignature::FnPtr(_) => {
                return Err(NotSupported(
                    "function pointer signatures can not be resolved".to_string(),
                ))
            }
        };

        Ok(resolved)
    }

    /// Rebuilds a single-child node if its child changed
    fn rebuild<'s>(
        &self,
        sig: &'s TypeSignature,
        base: &'s TypeSignature,
        guard: &mut RecursionGuard,
        wrap: impl FnOnce(Box<TypeSignature>) -> TypeSignature,
    ) -> Result<Cow<'s, TypeSignature>> {
        Ok(match self.resolve_with_guard(base, guard)? {
            Cow::Borrowed(_) => Cow::Borrowed(sig),
            Cow::Owned(next) => Cow::Owned(wrap(Box::new(next))),
        })
    }

    fn resolve_generic_inst<'s>(
        &self,
        sig: &'s TypeSignature,
        generic: &'s TypeSignature,
        args: &'s [TypeSignature],
        guard: &mut RecursionGuard,
    ) -> Result<Cow<'s, TypeSignature>> {
        let resolved_generic = self.resolve_with_guard(generic, guard)?;
        if !resolved_generic.is_class_or_value_type() {
            return Err(malformed_error!(
                "Generic instantiation of a non class or value type - {:?}",
                resolved_generic
            ));
        }

        let mut changed = matches!(resolved_generic, Cow::Owned(_));
        let mut resolved_args = Vec::with_capacity(args.len());
        for arg in args {
            let resolved = self.resolve_with_guard(arg, guard)?;
            changed |= matches!(resolved, Cow::Owned(_));
            resolved_args.push(resolved);
        }

        if !changed {
            return Ok(Cow::Borrowed(sig));
        }

        Ok(Cow::Owned(TypeSignature::GenericInst(
            Box::new(resolved_generic.into_owned()),
            resolved_args.into_iter().map(Cow::into_owned).collect(),
        )))
    }

    fn report(error: &Error) {
        match error {
            Error::RecursionLimit(max_depth) => {
                warn!(max_depth, "generic resolution aborted, signature nested too deep");
            }
            other => debug!(%other, "generic resolution failed"),
        }
    }
}
