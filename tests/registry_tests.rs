//! Hidden-set registry behavior under repeated and concurrent registration.

use std::sync::Arc;
use std::thread;

use callsite_enrich::{HiddenSetRegistry, ModuleKind, ModuleRef, TypeRef};

#[test]
fn test_duplicate_registration_leaves_size_unchanged() {
    let registry = HiddenSetRegistry::new();
    let module = ModuleRef::new("metrics", ModuleKind::Application);
    let ty = TypeRef::new("Recorder").with_namespace("Metrics");

    registry.add_hidden_module(&module);
    registry.add_hidden_module(&module);
    registry.add_hidden_type(&ty);
    registry.add_hidden_type(&ty);

    assert_eq!(registry.hidden_module_count(), 1);
    assert_eq!(registry.hidden_type_count(), 1);
}

#[test]
fn test_concurrent_registration_loses_no_entries() {
    const THREADS: usize = 8;
    const ITEMS: usize = 64;

    let registry = Arc::new(HiddenSetRegistry::new());

    // Every thread registers all M items; duplicates must collapse and no
    // update may be lost.
    let handles: Vec<_> = (0..THREADS)
        .map(|_| {
            let registry = Arc::clone(&registry);
            thread::spawn(move || {
                for i in 0..ITEMS {
                    let module =
                        ModuleRef::new(format!("module-{i}"), ModuleKind::Application);
                    registry.add_hidden_module(&module);
                    let ty = TypeRef::new(format!("Type{i}")).with_namespace("App");
                    registry.add_hidden_type(&ty);
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().expect("registration thread panicked");
    }

    assert_eq!(registry.hidden_module_count(), ITEMS);
    assert_eq!(registry.hidden_type_count(), ITEMS);
    for i in 0..ITEMS {
        let module = ModuleRef::new(format!("module-{i}"), ModuleKind::Application);
        assert!(registry.is_hidden_module(&module), "module-{i} missing");
    }
}

#[test]
fn test_readers_never_observe_torn_sets() {
    const ITEMS: usize = 128;
    const READERS: usize = 4;

    let registry = Arc::new(HiddenSetRegistry::new());

    let writer = {
        let registry = Arc::clone(&registry);
        thread::spawn(move || {
            for i in 0..ITEMS {
                let module = ModuleRef::new(format!("module-{i}"), ModuleKind::Application);
                registry.add_hidden_module(&module);
            }
        })
    };

    // Readers poll membership while the writer grows the set. Monotonic
    // growth means a module observed hidden must stay hidden: observing a
    // later registration but not an earlier completed one would mean a
    // torn or stale-partial snapshot.
    let readers: Vec<_> = (0..READERS)
        .map(|_| {
            let registry = Arc::clone(&registry);
            thread::spawn(move || {
                let probe = ModuleRef::new("module-0", ModuleKind::Application);
                let mut seen = false;
                while registry.hidden_module_count() < ITEMS {
                    let hidden = registry.is_hidden_module(&probe);
                    if seen {
                        assert!(hidden, "previously visible entry disappeared");
                    }
                    seen = seen || hidden;
                }
            })
        })
        .collect();

    writer.join().expect("writer thread panicked");
    for reader in readers {
        reader.join().expect("reader thread panicked");
    }

    assert_eq!(registry.hidden_module_count(), ITEMS);
}
