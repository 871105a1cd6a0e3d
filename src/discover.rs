//! Building addressable test case descriptors from scanned members.
//!
//! Discovery is a pure metadata pass: it never instantiates a declaring
//! type and never resolves a parameter.

use crate::registry::{scan, Member, Module};
use crate::theory::NestedIdentity;

/// Where a test case came from.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceRef {
    /// Name of the source module.
    pub module: String,
    /// Name of the declaring type inside the module.
    pub declaring: String,
}

/// One addressable, independently reportable unit of execution: the unit
/// exchanged with the host platform. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct TestCaseDescriptor {
    /// Globally unique identifier: `declaringType.memberName` verbatim.
    /// Never the display name, which is not guaranteed unique and must not
    /// be used for lookup.
    pub id: String,
    pub display_name: String,
    /// Present when the member carries a skip marker; the member is then
    /// never invoked.
    pub skip_reason: Option<String>,
    pub source: SourceRef,
}

/// Map each scanned member of `module` to a descriptor.
pub fn build_cases(module: &Module) -> Vec<TestCaseDescriptor> {
    scan(module)
        .iter()
        .map(|hit| describe(module, hit.member))
        .collect()
}

/// Build the descriptor for one member. Display-name order: explicit
/// marker name, else the computed `parent.local` name for nested members,
/// else the raw member name.
pub fn describe(module: &Module, member: &Member) -> TestCaseDescriptor {
    let display_name = member
        .markers
        .test
        .as_ref()
        .and_then(|t| t.display_name.clone())
        .or_else(|| NestedIdentity::parse(member.raw_name).map(|n| n.display_name()))
        .unwrap_or_else(|| member.raw_name.to_string());

    TestCaseDescriptor {
        id: member.id(),
        display_name,
        skip_reason: member
            .markers
            .skip
            .as_ref()
            .map(|s| s.reason.clone().unwrap_or_default()),
        source: SourceRef {
            module: module.name.clone(),
            declaring: member.declaring.to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::Member;

    #[test]
    fn identifier_is_the_qualified_raw_name() {
        let mut module = Module::new("m");
        module.register(Member::builder("Calc", "adds").test().build());

        let cases = build_cases(&module);
        assert_eq!(cases.len(), 1);
        assert_eq!(cases[0].id, "Calc.adds");
        assert_eq!(cases[0].display_name, "adds");
    }

    #[test]
    fn explicit_display_name_wins() {
        let mut module = Module::new("m");
        module.register(
            Member::builder("Calc", "adds")
                .display_name("Calculator adds numbers")
                .build(),
        );

        let cases = build_cases(&module);
        assert_eq!(cases[0].display_name, "Calculator adds numbers");
        // The identifier is unaffected by the override.
        assert_eq!(cases[0].id, "Calc.adds");
    }

    #[test]
    fn nested_members_display_as_parent_dot_local() {
        let mut module = Module::new("m");
        module.register(Member::builder("Calc", "<adds>g__rounds|0_0").test().build());

        let cases = build_cases(&module);
        assert_eq!(cases[0].display_name, "adds.rounds");
        assert_eq!(cases[0].id, "Calc.<adds>g__rounds|0_0");
    }

    #[test]
    fn skip_reason_is_surfaced() {
        let mut module = Module::new("m");
        module.register(Member::builder("Calc", "adds").test().skip(Some("flaky")).build());

        let cases = build_cases(&module);
        assert_eq!(cases[0].skip_reason.as_deref(), Some("flaky"));
    }
}
