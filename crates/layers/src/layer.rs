use scene::AppSnapshot;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct LayerId(pub u64);

pub trait Layer {
    fn id(&self) -> LayerId;

    /// Whether the layer draws anything for this state at all.
    fn is_shown(&self, snapshot: &AppSnapshot) -> bool {
        snapshot.layers_visible
    }
}
