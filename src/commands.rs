//! Command handlers
//!
//! Each handler resolves the collection it acts on, takes the per-collection
//! lock, runs load-mutate-save and hands the chosen image to the background
//! setter. The registry and setter are passed in from `main`, so nothing in
//! here reaches for globals.

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use tracing::{error, info, warn};

use crate::cli::{Commands, ListTarget, UseTarget};
use crate::collection::Collection;
use crate::error::Error;
use crate::lock;
use crate::registry::{CycleDirection, Registry, validate_name};
use crate::setter::BackgroundSetter;

/// Execute one parsed command against the configuration root.
pub fn run(command: &Commands, registry: &Registry, setter: &dyn BackgroundSetter) -> Result<()> {
    match command {
        Commands::Next => navigate(registry, setter, Navigation::Next),
        Commands::Previous => navigate(registry, setter, Navigation::Previous),
        Commands::Random => navigate(registry, setter, Navigation::Random),
        Commands::Add { name, paths } => add(registry, name, paths),
        Commands::Create { name } => create(registry, name),
        Commands::List { target } => list(registry, target),
        Commands::Current => current(registry),
        Commands::Refresh { name } => match name {
            Some(name) => refresh_one(registry, name),
            None => refresh_all(registry),
        },
        Commands::Use { target } => use_target(registry, setter, target),
    }
}

enum Navigation {
    Next,
    Previous,
    Random,
}

/// Name of the current collection, verified to exist. The pointer is left
/// alone when stale; `use` is the way to repoint it. A hand-edited pointer
/// holding an invalid name is rejected before it becomes a path component.
fn require_current(registry: &Registry) -> Result<String, Error> {
    let name = registry.current_name()?.ok_or(Error::NoCurrentCollection)?;
    validate_name(&name)?;
    if !registry.contains(&name) {
        return Err(Error::CollectionNotFound(name));
    }
    Ok(name)
}

fn navigate(registry: &Registry, setter: &dyn BackgroundSetter, navigation: Navigation) -> Result<()> {
    let name = require_current(registry)?;
    let _lock = lock::acquire(registry.root(), &name)?;

    let mut collection = Collection::load(registry.root(), &name)
        .with_context(|| format!("loading collection '{name}'"))?;
    let image = match navigation {
        Navigation::Next => collection.next()?,
        Navigation::Previous => collection.previous()?,
        Navigation::Random => collection.random_pick()?,
    }
    .to_path_buf();
    collection
        .save()
        .with_context(|| format!("saving collection '{name}'"))?;

    info!(collection = %collection.name(), image = %image.display(), "Switching background");
    setter.apply(&image);
    Ok(())
}

fn add(registry: &Registry, name: &str, paths: &[PathBuf]) -> Result<()> {
    validate_name(name)?;
    let existed = registry.contains(name);
    let _lock = lock::acquire(registry.root(), name)?;

    let mut collection = Collection::load(registry.root(), name)
        .with_context(|| format!("loading collection '{name}'"))?;
    let discovered = collection.add(paths)?;
    collection
        .save()
        .with_context(|| format!("saving collection '{name}'"))?;

    if !existed {
        info!("Created collection '{name}'");
    }
    info!("Added {} image(s) to '{name}'", discovered);
    Ok(())
}

fn create(registry: &Registry, name: &str) -> Result<()> {
    validate_name(name)?;
    let _lock = lock::acquire(registry.root(), name)?;

    if registry.contains(name) {
        info!("Collection '{name}' already exists");
        return Ok(());
    }
    Collection::load(registry.root(), name)?
        .save()
        .with_context(|| format!("creating collection '{name}'"))?;
    info!("Created collection '{name}'");
    Ok(())
}

fn list(registry: &Registry, target: &ListTarget) -> Result<()> {
    match target {
        ListTarget::Collections => {
            for name in registry.list_collections()? {
                println!("{name}");
            }
            Ok(())
        }
        ListTarget::Current => {
            let name = require_current(registry)?;
            list_images(registry, &name)
        }
        ListTarget::Name(name) => {
            validate_name(name)?;
            if !registry.contains(name) {
                return Err(Error::CollectionNotFound(name.clone()).into());
            }
            list_images(registry, name)
        }
    }
}

fn list_images(registry: &Registry, name: &str) -> Result<()> {
    let _lock = lock::acquire(registry.root(), name)?;
    let collection = Collection::load(registry.root(), name)
        .with_context(|| format!("loading collection '{name}'"))?;
    for image in collection.images() {
        println!("{}", image.display());
    }
    Ok(())
}

fn current(registry: &Registry) -> Result<()> {
    let name = require_current(registry)?;
    let _lock = lock::acquire(registry.root(), &name)?;
    let collection = Collection::load(registry.root(), &name)
        .with_context(|| format!("loading collection '{name}'"))?;
    println!("{} {}", name, collection.current()?.display());
    Ok(())
}

fn refresh_one(registry: &Registry, name: &str) -> Result<()> {
    validate_name(name)?;
    if !registry.contains(name) {
        return Err(Error::CollectionNotFound(name.to_string()).into());
    }
    let _lock = lock::acquire(registry.root(), name)?;
    let mut collection = Collection::load(registry.root(), name)
        .with_context(|| format!("loading collection '{name}'"))?;
    collection.refresh()?;
    Ok(())
}

/// Refresh every collection; one broken collection must not shield the rest.
fn refresh_all(registry: &Registry) -> Result<()> {
    let names = registry.list_collections()?;
    let total = names.len();
    let mut failed = 0usize;
    for name in names {
        if let Err(err) = refresh_one(registry, &name) {
            error!("Refreshing '{name}' failed: {err:#}");
            failed += 1;
        }
    }
    if failed > 0 {
        bail!("refresh failed for {failed} of {total} collection(s)");
    }
    Ok(())
}

fn use_target(registry: &Registry, setter: &dyn BackgroundSetter, target: &UseTarget) -> Result<()> {
    let direction = match target {
        // naming a collection only moves the pointer
        UseTarget::Name(name) => {
            registry.set_current(name)?;
            return Ok(());
        }
        UseTarget::Next => CycleDirection::Forward,
        UseTarget::Previous => CycleDirection::Backward,
    };

    let name = registry.cycle_current(direction)?;
    let _lock = lock::acquire(registry.root(), &name)?;
    let collection = Collection::load(registry.root(), &name)
        .with_context(|| format!("loading collection '{name}'"))?;
    if collection.is_empty() {
        warn!("Collection '{name}' has no images; background left unchanged");
    } else {
        setter.apply(collection.current()?);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::fs::{self, File};
    use std::path::Path;
    use tempfile::TempDir;

    /// Setter double that records every applied image.
    #[derive(Default)]
    struct RecordingSetter {
        applied: RefCell<Vec<PathBuf>>,
    }

    impl RecordingSetter {
        fn applied(&self) -> Vec<PathBuf> {
            self.applied.borrow().clone()
        }
    }

    impl BackgroundSetter for RecordingSetter {
        fn apply(&self, image: &Path) {
            self.applied.borrow_mut().push(image.to_path_buf());
        }
    }

    fn test_registry() -> (Registry, TempDir) {
        let dir = tempfile::tempdir().unwrap();
        (Registry::new(dir.path().join("cfg")), dir)
    }

    /// Directory with a.png and b.png in it.
    fn image_tree() -> TempDir {
        let dir = tempfile::tempdir().unwrap();
        File::create(dir.path().join("a.png")).unwrap();
        File::create(dir.path().join("b.png")).unwrap();
        dir
    }

    fn domain_error(err: &anyhow::Error) -> &Error {
        err.downcast_ref::<Error>().expect("expected a domain error")
    }

    #[test]
    fn test_add_creates_collection_with_images() {
        let (registry, _dir) = test_registry();
        let tree = image_tree();
        let setter = RecordingSetter::default();

        let command = Commands::Add {
            name: "art".to_string(),
            paths: vec![tree.path().to_path_buf()],
        };
        run(&command, &registry, &setter).unwrap();

        assert!(registry.contains("art"));
        let collection = Collection::load(registry.root(), "art").unwrap();
        assert_eq!(collection.images().len(), 2);
        assert!(setter.applied().is_empty(), "add must not touch the background");
    }

    #[test]
    fn test_add_rejects_reserved_name() {
        let (registry, _dir) = test_registry();
        let setter = RecordingSetter::default();

        let command = Commands::Add {
            name: ".images.art".to_string(),
            paths: vec![PathBuf::from("/tmp")],
        };
        let err = run(&command, &registry, &setter).unwrap_err();
        assert!(matches!(domain_error(&err), Error::InvalidName(_)));
    }

    #[test]
    fn test_create_is_idempotent() {
        let (registry, _dir) = test_registry();
        let setter = RecordingSetter::default();
        let command = Commands::Create {
            name: "art".to_string(),
        };

        run(&command, &registry, &setter).unwrap();
        run(&command, &registry, &setter).unwrap();

        assert!(registry.contains("art"));
        let collection = Collection::load(registry.root(), "art").unwrap();
        assert!(collection.is_empty());
    }

    #[test]
    fn test_next_applies_and_persists() {
        let (registry, _dir) = test_registry();
        let tree = image_tree();
        let setter = RecordingSetter::default();

        run(
            &Commands::Add {
                name: "art".to_string(),
                paths: vec![tree.path().to_path_buf()],
            },
            &registry,
            &setter,
        )
        .unwrap();
        run(
            &Commands::Use {
                target: UseTarget::Name("art".to_string()),
            },
            &registry,
            &setter,
        )
        .unwrap();

        run(&Commands::Next, &registry, &setter).unwrap();

        assert_eq!(setter.applied(), vec![tree.path().join("b.png")]);
        let index = fs::read_to_string(registry.root().join(".current.art")).unwrap();
        assert_eq!(index.trim(), "1");
    }

    #[test]
    fn test_navigation_round_trip() {
        let (registry, _dir) = test_registry();
        let tree = image_tree();
        let setter = RecordingSetter::default();

        run(
            &Commands::Add {
                name: "art".to_string(),
                paths: vec![tree.path().to_path_buf()],
            },
            &registry,
            &setter,
        )
        .unwrap();
        registry.set_current("art").unwrap();

        run(&Commands::Next, &registry, &setter).unwrap();
        run(&Commands::Previous, &registry, &setter).unwrap();

        // two images: next lands on b, previous wraps back to a
        assert_eq!(
            setter.applied(),
            vec![tree.path().join("b.png"), tree.path().join("a.png")]
        );
    }

    #[test]
    fn test_random_applies_an_image_from_the_collection() {
        let (registry, _dir) = test_registry();
        let tree = image_tree();
        let setter = RecordingSetter::default();

        run(
            &Commands::Add {
                name: "art".to_string(),
                paths: vec![tree.path().to_path_buf()],
            },
            &registry,
            &setter,
        )
        .unwrap();
        registry.set_current("art").unwrap();

        run(&Commands::Random, &registry, &setter).unwrap();

        let applied = setter.applied();
        assert_eq!(applied.len(), 1);
        assert!(applied[0] == tree.path().join("a.png") || applied[0] == tree.path().join("b.png"));
    }

    #[test]
    fn test_next_without_pointer() {
        let (registry, _dir) = test_registry();
        let setter = RecordingSetter::default();

        let err = run(&Commands::Next, &registry, &setter).unwrap_err();
        assert!(matches!(domain_error(&err), Error::NoCurrentCollection));
        assert!(setter.applied().is_empty());
    }

    #[test]
    fn test_next_with_stale_pointer() {
        let (registry, _dir) = test_registry();
        let setter = RecordingSetter::default();
        registry.set_current("gone").unwrap();

        let err = run(&Commands::Next, &registry, &setter).unwrap_err();
        assert!(matches!(domain_error(&err), Error::CollectionNotFound(_)));
    }

    #[test]
    fn test_next_on_empty_collection() {
        let (registry, _dir) = test_registry();
        let setter = RecordingSetter::default();

        run(
            &Commands::Create {
                name: "art".to_string(),
            },
            &registry,
            &setter,
        )
        .unwrap();
        registry.set_current("art").unwrap();

        let err = run(&Commands::Next, &registry, &setter).unwrap_err();
        assert!(matches!(domain_error(&err), Error::EmptyCollection(_)));
        assert!(setter.applied().is_empty());
    }

    #[test]
    fn test_use_name_only_moves_pointer() {
        let (registry, _dir) = test_registry();
        let tree = image_tree();
        let setter = RecordingSetter::default();

        run(
            &Commands::Add {
                name: "art".to_string(),
                paths: vec![tree.path().to_path_buf()],
            },
            &registry,
            &setter,
        )
        .unwrap();
        run(
            &Commands::Use {
                target: UseTarget::Name("art".to_string()),
            },
            &registry,
            &setter,
        )
        .unwrap();

        assert_eq!(registry.current_name().unwrap(), Some("art".to_string()));
        assert!(setter.applied().is_empty());
    }

    #[test]
    fn test_use_next_cycles_and_applies() {
        let (registry, _dir) = test_registry();
        let tree = image_tree();
        let setter = RecordingSetter::default();

        run(
            &Commands::Add {
                name: "art".to_string(),
                paths: vec![tree.path().join("a.png")],
            },
            &registry,
            &setter,
        )
        .unwrap();
        run(
            &Commands::Add {
                name: "nature".to_string(),
                paths: vec![tree.path().join("b.png")],
            },
            &registry,
            &setter,
        )
        .unwrap();
        registry.set_current("art").unwrap();

        run(
            &Commands::Use {
                target: UseTarget::Next,
            },
            &registry,
            &setter,
        )
        .unwrap();

        assert_eq!(registry.current_name().unwrap(), Some("nature".to_string()));
        assert_eq!(setter.applied(), vec![tree.path().join("b.png")]);
    }

    #[test]
    fn test_use_next_into_empty_collection_keeps_pointer_move() {
        let (registry, _dir) = test_registry();
        let tree = image_tree();
        let setter = RecordingSetter::default();

        run(
            &Commands::Add {
                name: "art".to_string(),
                paths: vec![tree.path().join("a.png")],
            },
            &registry,
            &setter,
        )
        .unwrap();
        run(
            &Commands::Create {
                name: "empty".to_string(),
            },
            &registry,
            &setter,
        )
        .unwrap();
        registry.set_current("empty").unwrap();

        run(
            &Commands::Use {
                target: UseTarget::Previous,
            },
            &registry,
            &setter,
        )
        .unwrap();
        assert_eq!(registry.current_name().unwrap(), Some("art".to_string()));

        // and cycling back into the empty one still succeeds, minus the apply
        run(
            &Commands::Use {
                target: UseTarget::Next,
            },
            &registry,
            &setter,
        )
        .unwrap();
        assert_eq!(registry.current_name().unwrap(), Some("empty".to_string()));
        assert_eq!(setter.applied(), vec![tree.path().join("a.png")]);
    }

    #[test]
    fn test_list_missing_collection() {
        let (registry, _dir) = test_registry();
        let setter = RecordingSetter::default();

        let err = run(
            &Commands::List {
                target: ListTarget::Name("gone".to_string()),
            },
            &registry,
            &setter,
        )
        .unwrap_err();
        assert!(matches!(domain_error(&err), Error::CollectionNotFound(_)));
    }

    #[test]
    fn test_refresh_named_collection_reconciles() {
        let (registry, _dir) = test_registry();
        let tree = image_tree();
        let setter = RecordingSetter::default();

        run(
            &Commands::Add {
                name: "art".to_string(),
                paths: vec![tree.path().to_path_buf()],
            },
            &registry,
            &setter,
        )
        .unwrap();

        File::create(tree.path().join("c.png")).unwrap();
        run(
            &Commands::Refresh {
                name: Some("art".to_string()),
            },
            &registry,
            &setter,
        )
        .unwrap();

        let collection = Collection::load(registry.root(), "art").unwrap();
        assert_eq!(collection.images().len(), 3);
    }

    #[test]
    fn test_refresh_all_continues_past_failures() {
        let (registry, _dir) = test_registry();
        let tree = image_tree();
        let setter = RecordingSetter::default();

        run(
            &Commands::Add {
                name: "good".to_string(),
                paths: vec![tree.path().to_path_buf()],
            },
            &registry,
            &setter,
        )
        .unwrap();
        run(
            &Commands::Create {
                name: "bad".to_string(),
            },
            &registry,
            &setter,
        )
        .unwrap();
        fs::write(registry.root().join(".current.bad"), "banana\n").unwrap();

        File::create(tree.path().join("c.png")).unwrap();
        let err = run(&Commands::Refresh { name: None }, &registry, &setter).unwrap_err();
        assert!(err.to_string().contains("1 of 2"));

        // the healthy collection was refreshed despite the broken one
        let collection = Collection::load(registry.root(), "good").unwrap();
        assert_eq!(collection.images().len(), 3);
    }

    #[test]
    fn test_current_on_empty_collection() {
        let (registry, _dir) = test_registry();
        let setter = RecordingSetter::default();

        run(
            &Commands::Create {
                name: "art".to_string(),
            },
            &registry,
            &setter,
        )
        .unwrap();
        registry.set_current("art").unwrap();

        let err = run(&Commands::Current, &registry, &setter).unwrap_err();
        assert!(matches!(domain_error(&err), Error::EmptyCollection(_)));
    }

    #[test]
    fn test_current_reports_without_touching_background() {
        let (registry, _dir) = test_registry();
        let tree = image_tree();
        let setter = RecordingSetter::default();

        run(
            &Commands::Add {
                name: "art".to_string(),
                paths: vec![tree.path().to_path_buf()],
            },
            &registry,
            &setter,
        )
        .unwrap();
        registry.set_current("art").unwrap();

        run(&Commands::Current, &registry, &setter).unwrap();
        assert!(setter.applied().is_empty(), "current must not touch the background");
    }
}
