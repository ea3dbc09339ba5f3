#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;

use optimistron_core::Event;
use optimistron_test::{
    create_item, delete_item, edit_item, edit_item_trailing, item, FuzzerConfig, ItemEvent,
    TransitionFuzzer,
};

#[derive(Arbitrary, Debug)]
enum Kind {
    Create,
    Edit,
    EditTrailing,
    Delete,
}

#[derive(Arbitrary, Debug)]
enum Op {
    Stage,
    Amend,
    Commit,
    Fail,
    Stash,
    Plain,
}

#[derive(Arbitrary, Debug)]
struct Step {
    kind: Kind,
    op: Op,
    transition: u8,
    item: u8,
    value: u8,
    revision: i8,
}

impl Step {
    fn event(&self) -> ItemEvent {
        let transitions = match self.kind {
            Kind::Create => create_item(),
            Kind::Edit => edit_item(),
            Kind::EditTrailing => edit_item_trailing(),
            Kind::Delete => delete_item(),
        };
        let id = format!("t{}", self.transition % 8);
        let payload = Some(item(
            &(self.item % 4).to_string(),
            &self.value.to_string(),
            i64::from(self.revision),
        ));

        match self.op {
            Op::Stage => transitions.stage(id, payload),
            Op::Amend => transitions.amend(id, payload),
            Op::Commit => transitions.commit(id),
            Op::Fail => transitions.fail(id, "fuzz"),
            Op::Stash => transitions.stash(id),
            Op::Plain => Event::new("fuzz::tick", payload),
        }
    }
}

fuzz_target!(|steps: Vec<Step>| {
    let Ok(fuzzer) = TransitionFuzzer::new(FuzzerConfig::light()) else {
        return;
    };
    let events: Vec<ItemEvent> = steps.iter().map(Step::event).collect();
    let result = fuzzer.replay(&events);

    assert!(result.is_valid(), "violations: {:?}", result.violations);
});
