//! Semantic analysis: subroutine-signature registration, class/subroutine
//! variable scoping, and call resolution.
//!
//! Ported from `Generator.py::SymTable`, split out as its own module since
//! semantic analysis is a distinct pipeline stage from code generation.
//! Two sweeps: [`SymTable::add_subs`] registers every class's subroutine
//! signatures up front (so forward references and cross-class calls
//! resolve) and checks OS conformance; [`SymTable::start_class`] and
//! [`SymTable::start_subroutine`] populate variable scope per class and
//! per subroutine as codegen walks the tree.
//!
//! `check_call` fixes three bugs present in the original: a missing `f`
//! prefix on two error-message format strings (so they printed the
//! literal text `{len(call.params)}` instead of interpolating), a dict
//! lookup that raised `KeyError` where the code caught `ValueError`
//! (silently skipping the "wrong call kind" branches), and a redundant
//! `len(call.names) == 2` check repeated immediately after itself. This
//! implementation classifies a call once, per the shape spec describes.

use rustc_hash::FxHashMap;

use crate::ast::{Call, Class, SubroutineKind, TypeTag};
use crate::error::SemanticError;
use crate::os_table;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubSig {
    pub kind: SubroutineKind,
    pub arity: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VarSegment {
    This,
    Static,
    Argument,
    Local,
}

impl VarSegment {
    #[must_use]
    pub fn as_vm_str(self) -> &'static str {
        match self {
            Self::This => "this",
            Self::Static => "static",
            Self::Argument => "argument",
            Self::Local => "local",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VarEntry {
    pub ty: TypeTag,
    pub segment: VarSegment,
    pub index: u16,
}

impl VarEntry {
    /// The entry's class name, if `ty` is a class type (not a primitive) —
    /// used to resolve the receiver class of an instance call.
    #[must_use]
    pub fn class_name(&self) -> Option<&str> {
        match &self.ty {
            TypeTag::Class(name) => Some(name.text.as_str()),
            TypeTag::Primitive(_) => None,
        }
    }

    #[must_use]
    pub fn is_subscriptable(&self) -> bool {
        match &self.ty {
            TypeTag::Primitive(_) => true,
            TypeTag::Class(name) => name.text == "Array",
        }
    }
}

pub enum CallTarget {
    ImplicitThis,
    StaticClass,
    Variable(VarEntry),
}

pub struct ResolvedCall {
    pub target: CallTarget,
    pub class: String,
    pub method: String,
    pub arity: u8,
}

pub struct SymTable {
    classes: FxHashMap<String, FxHashMap<String, SubSig>>,
    class_name: String,
    field_count: u16,
    static_count: u16,
    class_scope: FxHashMap<String, VarEntry>,
    sub_scope: FxHashMap<String, VarEntry>,
}

impl Default for SymTable {
    fn default() -> Self {
        Self::new()
    }
}

impl SymTable {
    #[must_use]
    pub fn new() -> Self {
        Self {
            classes: FxHashMap::default(),
            class_name: String::new(),
            field_count: 0,
            static_count: 0,
            class_scope: FxHashMap::default(),
            sub_scope: FxHashMap::default(),
        }
    }

    #[must_use]
    pub fn field_count(&self) -> u16 {
        self.field_count
    }

    fn check_type(&self, ty: &TypeTag, line: usize) -> Result<(), SemanticError> {
        if let TypeTag::Class(name) = ty {
            if !self.classes.contains_key(&name.text) && !os_table::is_os_class(&name.text) {
                return Err(SemanticError::UndefinedType {
                    line,
                    name: name.text.clone(),
                });
            }
        }
        Ok(())
    }

    /// Sweep 1: registers every class's subroutine signatures, rejects
    /// duplicate class/subroutine names, and checks OS conformance.
    ///
    /// # Errors
    /// [`SemanticError::Redefined`] on a duplicate class or subroutine
    /// name; [`SemanticError::NonConformingOs`] if a user class shares an
    /// OS class's name but is missing one of its declared signatures.
    pub fn add_subs(&mut self, classes: &[Class]) -> Result<(), SemanticError> {
        for class in classes {
            if self.classes.contains_key(&class.name.text) {
                return Err(SemanticError::Redefined {
                    line: class.name.line,
                    name: class.name.text.clone(),
                });
            }
            let mut subs = FxHashMap::default();
            for sub in &class.subroutines {
                if subs.contains_key(&sub.name.text) {
                    return Err(SemanticError::Redefined {
                        line: sub.name.line,
                        name: sub.name.text.clone(),
                    });
                }
                subs.insert(
                    sub.name.text.clone(),
                    SubSig {
                        kind: sub.kind,
                        arity: sub.params.len() as u8,
                    },
                );
            }
            self.classes.insert(class.name.text.clone(), subs);
        }

        for class in classes {
            if !os_table::is_os_class(&class.name.text) {
                continue;
            }
            for (method, sig) in os_table::signatures_for(&class.name.text) {
                let actual = self.classes[&class.name.text].get(method);
                let conforms = actual.is_some_and(|a| a.kind == sig.kind && a.arity == sig.arity);
                if !conforms {
                    return Err(SemanticError::NonConformingOs {
                        line: class.name.line,
                        name: class.name.text.clone(),
                        method: method.to_string(),
                    });
                }
            }
        }
        Ok(())
    }

    fn lookup_sub(&self, class: &str, method: &str) -> Option<SubSig> {
        self.classes
            .get(class)
            .and_then(|subs| subs.get(method))
            .copied()
            .or_else(|| {
                os_table::lookup(class, method).map(|sig| SubSig {
                    kind: sig.kind,
                    arity: sig.arity,
                })
            })
    }

    fn is_class(&self, name: &str) -> bool {
        self.classes.contains_key(name) || os_table::is_os_class(name)
    }

    /// Sweep 2, part 1: resets the per-class field counter (the static
    /// counter is program-global, not per class) and populates class
    /// scope with every field/static variable at a fresh index.
    ///
    /// # Errors
    /// [`SemanticError::Redefined`] on a duplicate class-var name;
    /// [`SemanticError::UndefinedType`] if a declared class type doesn't
    /// resolve.
    pub fn start_class(&mut self, class: &Class) -> Result<(), SemanticError> {
        self.class_name = class.name.text.clone();
        self.field_count = 0;
        self.class_scope.clear();

        for class_var in &class.class_vars {
            self.check_type(&class_var.decl.ty, class_var.decl.line)?;
            let name = &class_var.decl.names[0];
            if self.class_scope.contains_key(&name.text) {
                return Err(SemanticError::Redefined {
                    line: name.line,
                    name: name.text.clone(),
                });
            }
            let (segment, index) = match class_var.scope {
                crate::ast::VarScope::Field => {
                    let i = self.field_count;
                    self.field_count += 1;
                    (VarSegment::This, i)
                }
                crate::ast::VarScope::Static => {
                    let i = self.static_count;
                    self.static_count += 1;
                    (VarSegment::Static, i)
                }
            };
            self.class_scope.insert(
                name.text.clone(),
                VarEntry {
                    ty: class_var.decl.ty.clone(),
                    segment,
                    index,
                },
            );
        }
        Ok(())
    }

    /// Sweep 2, part 2: resets subroutine scope for a new subroutine;
    /// `method`s reserve `argument 0` for the implicit `this` before any
    /// user parameter is assigned a slot.
    ///
    /// # Errors
    /// [`SemanticError::Redefined`] on a duplicate parameter/local name;
    /// [`SemanticError::UndefinedType`] if a declared type doesn't
    /// resolve.
    pub fn start_subroutine(&mut self, sub: &crate::ast::Subroutine) -> Result<(), SemanticError> {
        self.sub_scope.clear();
        let mut arg_count: u16 = if sub.kind == SubroutineKind::Method { 1 } else { 0 };
        let mut local_count: u16 = 0;

        for param in &sub.params {
            self.check_type(&param.ty, param.name.line)?;
            if self.sub_scope.contains_key(&param.name.text) {
                return Err(SemanticError::Redefined {
                    line: param.name.line,
                    name: param.name.text.clone(),
                });
            }
            self.sub_scope.insert(
                param.name.text.clone(),
                VarEntry {
                    ty: param.ty.clone(),
                    segment: VarSegment::Argument,
                    index: arg_count,
                },
            );
            arg_count += 1;
        }

        for decl in &sub.locals {
            self.check_type(&decl.ty, decl.line)?;
            for name in &decl.names {
                if self.sub_scope.contains_key(&name.text) {
                    return Err(SemanticError::Redefined {
                        line: name.line,
                        name: name.text.clone(),
                    });
                }
                self.sub_scope.insert(
                    name.text.clone(),
                    VarEntry {
                        ty: decl.ty.clone(),
                        segment: VarSegment::Local,
                        index: local_count,
                    },
                );
                local_count += 1;
            }
        }
        Ok(())
    }

    #[must_use]
    pub fn lookup_var(&self, name: &str) -> Option<VarEntry> {
        self.sub_scope
            .get(name)
            .or_else(|| self.class_scope.get(name))
            .cloned()
    }

    /// Classifies and resolves a call per the rule: a bare `F(...)` is an
    /// instance call on the implicit `this` (only valid inside a
    /// method/constructor); `C.F(...)` is a static call if `C` resolves
    /// as a class and `F` is a class-scope (non-method) member of it,
    /// otherwise `C` must resolve as a variable and `F` an instance
    /// method of its declared type.
    ///
    /// # Errors
    /// [`SemanticError::WrongCallKind`] for a bare call outside any
    /// method/constructor, or a call that resolves to a member of the
    /// wrong dispatch kind; [`SemanticError::UndefinedVariable`] if
    /// neither a class nor a variable resolves; [`SemanticError::WrongArity`]
    /// on an argument-count mismatch.
    pub fn check_call(
        &self,
        call: &Call,
        current_class: &str,
        has_implicit_this: bool,
    ) -> Result<ResolvedCall, SemanticError> {
        let found = call.params.len() as u8;

        if call.names.len() == 1 {
            let method = &call.names[0];
            if !has_implicit_this {
                return Err(SemanticError::WrongCallKind {
                    line: call.line,
                    message: format!("'{}' has no implicit receiver here", method.text),
                });
            }
            let sig = self.lookup_sub(current_class, &method.text).ok_or_else(|| {
                SemanticError::UndefinedVariable {
                    line: call.line,
                    name: method.text.clone(),
                }
            })?;
            if sig.kind != SubroutineKind::Method {
                return Err(SemanticError::WrongCallKind {
                    line: call.line,
                    message: format!("'{}' is not an instance method", method.text),
                });
            }
            Self::check_arity(call.line, &method.text, sig.arity, found)?;
            return Ok(ResolvedCall {
                target: CallTarget::ImplicitThis,
                class: current_class.to_string(),
                method: method.text.clone(),
                arity: sig.arity,
            });
        }

        let name0 = &call.names[0];
        let name1 = &call.names[1];

        if self.is_class(&name0.text) {
            let sig = self.lookup_sub(&name0.text, &name1.text).ok_or_else(|| {
                SemanticError::UndefinedVariable {
                    line: call.line,
                    name: format!("{}.{}", name0.text, name1.text),
                }
            })?;
            if sig.kind == SubroutineKind::Method {
                return Err(SemanticError::WrongCallKind {
                    line: call.line,
                    message: format!("'{}.{}' is not a class member", name0.text, name1.text),
                });
            }
            Self::check_arity(call.line, &name1.text, sig.arity, found)?;
            return Ok(ResolvedCall {
                target: CallTarget::StaticClass,
                class: name0.text.clone(),
                method: name1.text.clone(),
                arity: sig.arity,
            });
        }

        let var = self.lookup_var(&name0.text).ok_or_else(|| SemanticError::UndefinedVariable {
            line: call.line,
            name: name0.text.clone(),
        })?;
        let ty_class = var.class_name().ok_or_else(|| SemanticError::WrongCallKind {
            line: call.line,
            message: format!("'{}' is not an object", name0.text),
        })?;
        let sig = self.lookup_sub(ty_class, &name1.text).ok_or_else(|| SemanticError::UndefinedVariable {
            line: call.line,
            name: format!("{ty_class}.{}", name1.text),
        })?;
        if sig.kind != SubroutineKind::Method {
            return Err(SemanticError::WrongCallKind {
                line: call.line,
                message: format!("'{ty_class}.{}' is not an instance method", name1.text),
            });
        }
        Self::check_arity(call.line, &name1.text, sig.arity, found)?;
        let class = ty_class.to_string();
        Ok(ResolvedCall {
            target: CallTarget::Variable(var),
            class,
            method: name1.text.clone(),
            arity: sig.arity,
        })
    }

    fn check_arity(line: usize, name: &str, expected: u8, found: u8) -> Result<(), SemanticError> {
        if expected == found {
            Ok(())
        } else {
            Err(SemanticError::WrongArity {
                line,
                name: name.to_string(),
                expected,
                found,
            })
        }
    }
}
