//! Theory expansion: a nested test member is routed through its parent,
//! which receives the nested member as a callback.

use std::sync::Arc;

use crate::check::Fault;
use crate::engine::{invoke, Outcome};
use crate::registry::{Member, Module};
use crate::resolve::{self, Callback, StandInSource};

/// Identity decoded from a generated local-function raw name.
///
/// The pattern is `<{parent}>g__{local}|{discriminator}`: a terminated
/// parent fragment, the generated-local marker, then the local member's
/// own fragment. Top-level member names never match, so nested theories
/// declared at the top level are unsupported by design.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NestedIdentity {
    pub parent: String,
    pub local: String,
}

impl NestedIdentity {
    pub fn parse(raw: &str) -> Option<NestedIdentity> {
        let rest = raw.strip_prefix('<')?;
        let close = rest.find('>')?;
        let parent = &rest[..close];
        let rest = rest[close + 1..].strip_prefix("g__")?;
        let local = match rest.find('|') {
            Some(bar) => &rest[..bar],
            None => rest,
        };
        if parent.is_empty() || local.is_empty() {
            return None;
        }
        Some(NestedIdentity {
            parent: parent.to_string(),
            local: local.to_string(),
        })
    }

    /// `parent.local`, the display form for nested tests.
    pub fn display_name(&self) -> String {
        format!("{}.{}", self.parent, self.local)
    }
}

/// Dispatch one member, routing nested members through their parent.
///
/// The nested member is never invoked directly: it runs only when the
/// parent calls the callback it is bound to, strictly within the parent
/// invocation's extent. A parent that never calls its callback therefore
/// yields a passing outcome for the nested case.
pub async fn run_member(
    module: &Module,
    member: &Arc<Member>,
    stand_ins: &dyn StandInSource,
) -> Outcome {
    match NestedIdentity::parse(member.raw_name) {
        None => dispatch(module, member, None, stand_ins).await,
        Some(nested) => {
            let parent = match module.find(member.declaring, &nested.parent) {
                Some(parent) => parent.clone(),
                None => {
                    return Outcome::Failed(Fault::new(
                        "resolution",
                        format!(
                            "parent member `{}.{}` not found",
                            member.declaring, nested.parent
                        ),
                    ));
                }
            };
            let callback = Callback::for_member(member);
            dispatch(module, &parent, Some(callback), stand_ins).await
        }
    }
}

async fn dispatch(
    module: &Module,
    member: &Arc<Member>,
    callback: Option<Callback>,
    stand_ins: &dyn StandInSource,
) -> Outcome {
    let group = module.effective_group(member);
    let resolution = match resolve::resolve(member, group, callback, stand_ins) {
        Ok(res) => res,
        Err(fault) => return Outcome::Failed(fault),
    };
    invoke(member, resolution.instance, resolution.args).await
}
