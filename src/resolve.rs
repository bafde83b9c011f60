use std::collections::HashMap;
use std::sync::Arc;

use crate::error::KitnError;
use crate::model::{ComponentRef, RegistryItem};
use crate::registry::{RegistryFetcher, Transport};

/// Anything that can turn a reference into a descriptor.
pub trait ItemSource {
    async fn fetch(&self, reference: &ComponentRef) -> Result<Arc<RegistryItem>, KitnError>;
}

impl<T: Transport> ItemSource for RegistryFetcher<T> {
    async fn fetch(&self, reference: &ComponentRef) -> Result<Arc<RegistryItem>, KitnError> {
        self.fetch_component(reference).await
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    InProgress,
    Done,
}

struct Frame {
    key: String,
    item: Arc<RegistryItem>,
    deps: Vec<ComponentRef>,
    next: usize,
}

/// A resolved component together with the reference it was reached by.
#[derive(Debug, Clone)]
pub struct Resolved {
    pub reference: ComponentRef,
    pub item: Arc<RegistryItem>,
}

pub struct Resolver<'a, S> {
    source: &'a S,
}

impl<'a, S: ItemSource> Resolver<'a, S> {
    pub fn new(source: &'a S) -> Self {
        Self { source }
    }

    /// Expand `roots` into the full install set, dependencies first.
    ///
    /// Each component appears once, at the position of its first
    /// post-order visit. A dependency cycle fails the whole resolution.
    pub async fn resolve(&self, roots: &[ComponentRef]) -> Result<Vec<Resolved>, KitnError> {
        let mut marks: HashMap<String, Mark> = HashMap::new();
        let mut order = Vec::new();
        let mut stack: Vec<(Frame, ComponentRef)> = Vec::new();

        for root in roots {
            if marks.contains_key(&root.graph_key()) {
                continue;
            }
            let frame = self.enter(root, &mut marks).await?;
            stack.push((frame, root.clone()));

            while let Some((top, _)) = stack.last_mut() {
                if top.next < top.deps.len() {
                    let dep = top.deps[top.next].clone();
                    top.next += 1;

                    match marks.get(&dep.graph_key()) {
                        Some(Mark::Done) => continue,
                        Some(Mark::InProgress) => {
                            return Err(cycle_error(&stack, &dep));
                        }
                        None => {
                            let frame = self.enter(&dep, &mut marks).await?;
                            stack.push((frame, dep));
                        }
                    }
                } else if let Some((frame, reference)) = stack.pop() {
                    marks.insert(frame.key, Mark::Done);
                    order.push(Resolved {
                        reference,
                        item: frame.item,
                    });
                }
            }
        }

        Ok(order)
    }

    async fn enter(
        &self,
        reference: &ComponentRef,
        marks: &mut HashMap<String, Mark>,
    ) -> Result<Frame, KitnError> {
        let item = self.source.fetch(reference).await?;
        let deps = item
            .registry_dependencies
            .iter()
            .map(|d| ComponentRef::parse(d))
            .collect::<Result<Vec<_>, _>>()?;

        let key = reference.graph_key();
        tracing::debug!("resolving {reference} ({} dependencies)", deps.len());
        marks.insert(key.clone(), Mark::InProgress);
        Ok(Frame {
            key,
            item,
            deps,
            next: 0,
        })
    }
}

fn cycle_error(stack: &[(Frame, ComponentRef)], repeated: &ComponentRef) -> KitnError {
    let key = repeated.graph_key();
    let start = stack.iter().position(|(f, _)| f.key == key).unwrap_or(0);
    let mut names: Vec<String> = stack[start..].iter().map(|(_, r)| r.install_key()).collect();
    names.push(repeated.install_key());
    KitnError::CircularDependency {
        cycle: names.join(" -> "),
    }
}
