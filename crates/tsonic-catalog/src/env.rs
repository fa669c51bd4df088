//! Derived queries over the catalog.
//!
//! The environment flattens the inheritance graph into lists and computes
//! the substitution maps that carry a receiver's type arguments down to the
//! declaring ancestor. The catalog is trusted to be acyclic; a visited set
//! guards the walks so a malformed catalog terminates.

use crate::catalog::{MemberEntry, MethodSignatureEntry, NominalCatalog, NominalKind};
use rustc_hash::FxHashSet;
use smallvec::SmallVec;
use tracing::trace;
use tsonic_ir::{IrType, SubstMap, TypeId, substitute};

/// Inheritance chains are short in practice; eight slots covers almost all
/// CLR hierarchies without spilling.
pub type InheritanceChain = SmallVec<[TypeId; 8]>;

#[derive(Clone, Copy, Debug)]
pub struct NominalEnv<'a> {
    catalog: &'a NominalCatalog,
}

impl<'a> NominalEnv<'a> {
    pub fn new(catalog: &'a NominalCatalog) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &'a NominalCatalog {
        self.catalog
    }

    /// The flattened inheritance chain starting at `id`, inclusive, in
    /// depth-first declaration order.
    pub fn inheritance_chain(&self, id: TypeId) -> InheritanceChain {
        let mut chain = InheritanceChain::new();
        let mut visited = FxHashSet::default();
        self.walk_chain(id, &mut chain, &mut visited);
        chain
    }

    fn walk_chain(&self, id: TypeId, chain: &mut InheritanceChain, visited: &mut FxHashSet<TypeId>) {
        if !visited.insert(id) {
            return;
        }
        chain.push(id);
        let Some(entry) = self.catalog.get(id) else {
            return;
        };
        for edge in &entry.inheritance {
            self.walk_chain(edge.target, chain, visited);
        }
    }

    /// Compute the substitution map for `target`'s type parameters when
    /// `receiver` instantiated with `receiver_args` is viewed as `target`.
    ///
    /// Returns `None` when `target` is not on the receiver's inheritance
    /// chain.
    pub fn get_instantiation(
        &self,
        receiver: TypeId,
        receiver_args: &[IrType],
        target: TypeId,
    ) -> Option<SubstMap> {
        let base = self.identity_map(receiver, receiver_args);
        let mut visited = FxHashSet::default();
        let found = self.instantiation_walk(receiver, base, target, &mut visited);
        trace!(
            receiver = receiver.0,
            target = target.0,
            found = found.is_some(),
            "get_instantiation"
        );
        found
    }

    fn instantiation_walk(
        &self,
        id: TypeId,
        map: SubstMap,
        target: TypeId,
        visited: &mut FxHashSet<TypeId>,
    ) -> Option<SubstMap> {
        if id == target {
            return Some(map);
        }
        if !visited.insert(id) {
            return None;
        }
        let entry = self.catalog.get(id)?;
        for edge in &entry.inheritance {
            let target_params = self.catalog.type_parameters(edge.target);
            let mut next = SubstMap::default();
            for (param, arg) in target_params.iter().zip(edge.arguments.iter()) {
                next.insert(param.name.clone(), substitute(arg, &map));
            }
            if let Some(found) = self.instantiation_walk(edge.target, next, target, visited) {
                return Some(found);
            }
        }
        None
    }

    /// Locate the nearest type on the receiver's chain that declares
    /// `member_name`, together with the substitution from that declaring
    /// type's parameters to the receiver's arguments.
    pub fn find_member_declaring_type(
        &self,
        receiver: TypeId,
        receiver_args: &[IrType],
        member_name: &str,
    ) -> Option<(TypeId, SubstMap)> {
        for candidate in self.inheritance_chain(receiver) {
            let entry = self.catalog.get(candidate)?;
            if entry.members.contains_key(member_name) {
                let map = self.get_instantiation(receiver, receiver_args, candidate)?;
                return Some((candidate, map));
            }
        }
        None
    }

    /// The Invoke signature of a delegate type.
    pub fn invoke_signature(&self, id: TypeId) -> Option<&'a MethodSignatureEntry> {
        let entry = self.catalog.get(id)?;
        if entry.kind != NominalKind::Delegate {
            return None;
        }
        let member = entry
            .members
            .get("invoke")
            .or_else(|| entry.members.get("Invoke"))?;
        match member {
            MemberEntry::Method { signatures } => signatures.first(),
            MemberEntry::Property(_) => None,
        }
    }

    /// Identity substitution for a type: its own parameters bound to the
    /// supplied arguments, or to themselves where arguments are missing.
    pub fn identity_map(&self, id: TypeId, args: &[IrType]) -> SubstMap {
        let mut map = SubstMap::default();
        for (i, param) in self.catalog.type_parameters(id).iter().enumerate() {
            let bound = match args.get(i) {
                Some(arg) => arg.clone(),
                None => IrType::type_param(&param.name),
            };
            map.insert(param.name.clone(), bound);
        }
        map
    }
}
