use crate::adapter::{ComponentAdapter, Strategy};
use crate::container::injector::ResolutionError;
use crate::container::Container;
use crate::introspect::{MemberDescriptor, MemberKind, Slot};
use crate::parameter::{Parameter, SlotRequest};

const DEFAULT_METHOD: &str = "inject";

impl ComponentAdapter {
    /// Picks the constructor the component is allocated with.
    ///
    /// Without a name, the public constructor with the most slots that can
    /// all be resolved wins, the earliest declared one among equals. If none
    /// can be satisfied, the greediest is returned so that resolving it
    /// reports the real cause.
    pub(super) fn select_constructor(
        &self,
        container: &Container,
    ) -> Result<&MemberDescriptor, ResolutionError> {
        if let Strategy::Constructor(Some(name)) = self.strategy {
            return self.named_member(MemberKind::Constructor, name);
        }

        let arity = (!self.parameters.is_empty()).then_some(self.parameters.len());
        let constructors: Vec<_> = self
            .implementation
            .constructors()
            .filter(|c| c.is_public())
            .filter(|c| arity.map_or(true, |arity| c.arity() == arity))
            .collect();

        let mut greediest: Option<&MemberDescriptor> = None;
        let mut satisfiable: Option<&MemberDescriptor> = None;
        for constructor in constructors {
            if greediest.map_or(true, |g| constructor.arity() > g.arity()) {
                greediest = Some(constructor);
            }
            if satisfiable.map_or(true, |s| constructor.arity() > s.arity())
                && self.is_satisfiable(container, constructor)
            {
                satisfiable = Some(constructor);
            }
        }

        satisfiable
            .or(greediest)
            .ok_or_else(|| ResolutionError::MemberNotFound {
                key: self.key.clone(),
                member: match arity {
                    Some(arity) => format!("public constructor taking {arity} arguments"),
                    None => String::from("public constructor"),
                },
            })
    }

    /// Finds the public constructor without slots that field and method
    /// injection start from.
    pub(super) fn default_constructor(&self) -> Result<&MemberDescriptor, ResolutionError> {
        self.implementation
            .constructors()
            .find(|c| c.is_public() && c.arity() == 0)
            .ok_or_else(|| ResolutionError::MemberNotFound {
                key: self.key.clone(),
                member: String::from("public default constructor"),
            })
    }

    /// Picks the fields and methods injected after allocation, in
    /// declaration order.
    pub(super) fn select_members(&self) -> Result<Vec<&MemberDescriptor>, ResolutionError> {
        let members = self.implementation.members().iter();
        match self.strategy {
            Strategy::Constructor(_) => Ok(Vec::new()),
            Strategy::Field(Some(name)) => Ok(vec![self.named_member(MemberKind::Field, name)?]),
            Strategy::Field(None) => Ok(members
                .filter(|m| m.kind() == MemberKind::Field && m.is_public())
                .collect()),
            Strategy::Method(name) => {
                let name = name.unwrap_or(DEFAULT_METHOD);
                Ok(vec![self.named_member(MemberKind::Method, name)?])
            }
            Strategy::Annotated => Ok(members
                .filter(|m| m.kind() != MemberKind::Constructor)
                .filter(|m| m.is_annotated() && m.is_public())
                .collect()),
        }
    }

    /// Lines up a binding with every slot of `members`: the registered
    /// parameters positionally, or each slot's own implicit binding.
    pub(super) fn bindings(
        &self,
        members: &[&MemberDescriptor],
    ) -> Result<Vec<Vec<Parameter>>, ResolutionError> {
        if self.parameters.is_empty() {
            return Ok(members
                .iter()
                .map(|m| m.slots().iter().map(Parameter::for_slot).collect())
                .collect());
        }

        let slots: usize = members.iter().map(|m| m.arity()).sum();
        if slots != self.parameters.len() {
            return Err(ResolutionError::MemberNotFound {
                key: self.key.clone(),
                member: format!("{} taking {} arguments", self.strategy, self.parameters.len()),
            });
        }

        let mut parameters = self.parameters.iter().cloned();
        Ok(members
            .iter()
            .map(|m| parameters.by_ref().take(m.arity()).collect())
            .collect())
    }

    pub(super) fn request<'a>(
        &'a self,
        member: &MemberDescriptor,
        index: usize,
        slot: &'a Slot,
    ) -> SlotRequest<'a> {
        SlotRequest {
            dependent: &self.key,
            member: member.name(),
            index,
            slot,
            use_names: self.use_names,
        }
    }

    fn is_satisfiable(&self, container: &Container, constructor: &MemberDescriptor) -> bool {
        let Ok(mut bindings) = self.bindings(&[constructor]) else {
            return false;
        };
        let bindings = bindings.pop().unwrap_or_default();
        constructor
            .slots()
            .iter()
            .zip(&bindings)
            .enumerate()
            .all(|(index, (slot, parameter))| {
                parameter.is_resolvable(container, &self.request(constructor, index, slot))
            })
    }

    fn named_member(
        &self,
        kind: MemberKind,
        name: &'static str,
    ) -> Result<&MemberDescriptor, ResolutionError> {
        let member = self.implementation.member(kind, name).ok_or_else(|| {
            ResolutionError::MemberNotFound {
                key: self.key.clone(),
                member: format!("{} `{name}`", kind_name(kind)),
            }
        })?;
        if member.is_public() {
            Ok(member)
        } else {
            Err(ResolutionError::AccessDenied {
                key: self.key.clone(),
                member: name,
            })
        }
    }
}

fn kind_name(kind: MemberKind) -> &'static str {
    match kind {
        MemberKind::Constructor => "constructor",
        MemberKind::Field => "field",
        MemberKind::Method => "method",
    }
}
