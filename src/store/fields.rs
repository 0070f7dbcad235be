use crate::{
    config,
    error::EngineError,
    hooks::{FalloffHook, FieldForceHook},
    types::{Color, FieldId, Vec2},
};

#[derive(Clone, Debug)]
pub enum FieldKind {
    Attraction,
    Repulsion,
    Gravity,
    Magnetic,
    Electric,
    Custom(FieldForceHook),
}

#[derive(Clone, Debug)]
pub enum Falloff {
    Linear,
    Quadratic,
    Exponential,
    Custom(FalloffHook),
}

impl Falloff {
    /// Force magnitude at `distance` from the center of a field of the given
    /// `strength` and `radius`. Callers exclude `distance > radius`.
    pub fn magnitude(
        &self,
        field: FieldId,
        strength: f32,
        distance: f32,
        radius: f32,
    ) -> Result<f32, EngineError> {
        let ratio = distance / radius;
        match self {
            Falloff::Linear => Ok(strength * (1.0 - ratio)),
            Falloff::Quadratic => Ok(strength * (1.0 - ratio).powi(2)),
            Falloff::Exponential => {
                Ok(strength * (-config::EXPONENTIAL_FALLOFF_RATE * ratio).exp())
            }
            Falloff::Custom(hook) => hook.run(field, distance, radius, strength),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FieldAppearance {
    pub color: Color,
    pub opacity: f32,
    pub visible: bool,
    pub pulse: bool,
}

impl Default for FieldAppearance {
    fn default() -> Self {
        Self {
            color: Color::rgb(80, 160, 255),
            opacity: 0.3,
            visible: true,
            pulse: false,
        }
    }
}

/// An energy field before the engine has assigned it an id.
#[derive(Clone, Debug)]
pub struct FieldSpec {
    pub kind: FieldKind,
    pub position: Vec2,
    pub strength: f32,
    pub radius: f32,
    pub falloff: Falloff,
    pub active: bool,
    pub appearance: FieldAppearance,
}

impl FieldSpec {
    pub fn new(kind: FieldKind, position: Vec2, strength: f32, radius: f32) -> Self {
        Self {
            kind,
            position,
            strength,
            radius,
            falloff: Falloff::Linear,
            active: true,
            appearance: FieldAppearance::default(),
        }
    }

    pub fn with_falloff(mut self, falloff: Falloff) -> Self {
        self.falloff = falloff;
        self
    }

    pub fn with_appearance(mut self, appearance: FieldAppearance) -> Self {
        self.appearance = appearance;
        self
    }

    pub fn inactive(mut self) -> Self {
        self.active = false;
        self
    }
}

#[derive(Clone, Debug)]
pub struct EnergyField {
    pub id: FieldId,
    pub kind: FieldKind,
    pub position: Vec2,
    pub strength: f32,
    pub radius: f32,
    pub falloff: Falloff,
    pub active: bool,
    pub appearance: FieldAppearance,
}

#[derive(Debug)]
pub struct FieldStore {
    fields: Vec<EnergyField>,
    next_id: FieldId,
}

impl Default for FieldStore {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldStore {
    pub fn new() -> Self {
        Self {
            fields: Vec::new(),
            next_id: 1,
        }
    }

    pub(crate) fn insert(&mut self, spec: FieldSpec) -> Result<EnergyField, EngineError> {
        if !(spec.radius.is_finite() && spec.radius > 0.0) {
            return Err(EngineError::InvalidField(format!(
                "radius must be positive, got {}",
                spec.radius
            )));
        }
        if !spec.position.is_finite() || !spec.strength.is_finite() {
            return Err(EngineError::InvalidField(
                "position and strength must be finite".into(),
            ));
        }
        let id = self.next_id;
        self.next_id += 1;
        let field = EnergyField {
            id,
            kind: spec.kind,
            position: spec.position,
            strength: spec.strength,
            radius: spec.radius,
            falloff: spec.falloff,
            active: spec.active,
            appearance: spec.appearance,
        };
        self.fields.push(field.clone());
        Ok(field)
    }

    pub(crate) fn remove(&mut self, id: FieldId) -> Option<EnergyField> {
        let idx = self.fields.iter().position(|f| f.id == id)?;
        Some(self.fields.remove(idx))
    }

    pub fn get(&self, id: FieldId) -> Option<&EnergyField> {
        self.fields.iter().find(|f| f.id == id)
    }

    pub(crate) fn get_mut(&mut self, id: FieldId) -> Option<&mut EnergyField> {
        self.fields.iter_mut().find(|f| f.id == id)
    }

    pub(crate) fn as_slice(&self) -> &[EnergyField] {
        &self.fields
    }

    pub fn snapshot(&self) -> Vec<EnergyField> {
        self.fields.clone()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub(crate) fn clear(&mut self) {
        self.fields.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod falloff {
        use super::*;

        #[test]
        fn linear_decreases_to_zero_at_radius() {
            let f = Falloff::Linear;
            assert_eq!(f.magnitude(1, 10.0, 0.0, 100.0).ok(), Some(10.0));
            assert_eq!(f.magnitude(1, 10.0, 50.0, 100.0).ok(), Some(5.0));
            assert_eq!(f.magnitude(1, 10.0, 100.0, 100.0).ok(), Some(0.0));
        }

        #[test]
        fn quadratic_halfway_is_quarter_strength() {
            let f = Falloff::Quadratic;
            let half = f.magnitude(1, 8.0, 50.0, 100.0).expect("built-in");
            assert!((half - 2.0).abs() < 1e-6);
        }

        #[test]
        fn exponential_decays_with_rate_three() {
            let f = Falloff::Exponential;
            let at_edge = f.magnitude(1, 1.0, 10.0, 10.0).expect("built-in");
            assert!((at_edge - (-3.0_f32).exp()).abs() < 1e-6);
        }

        #[test]
        fn custom_delegates_to_hook() {
            let f = Falloff::Custom(FalloffHook::new(|_, _, s| Ok(s * 2.0)));
            assert_eq!(f.magnitude(1, 3.0, 1.0, 10.0).ok(), Some(6.0));
        }
    }

    mod store {
        use super::*;

        fn spec(radius: f32) -> FieldSpec {
            FieldSpec::new(FieldKind::Attraction, Vec2::ZERO, 1.0, radius)
        }

        #[test]
        fn assigns_increasing_ids() {
            let mut store = FieldStore::new();
            let a = store.insert(spec(10.0)).expect("valid");
            let b = store.insert(spec(10.0)).expect("valid");
            assert!(b.id > a.id);
            assert_eq!(store.len(), 2);
        }

        #[test]
        fn rejects_non_positive_radius() {
            let mut store = FieldStore::new();
            assert!(matches!(
                store.insert(spec(0.0)),
                Err(EngineError::InvalidField(_))
            ));
            assert!(store.is_empty());
        }

        #[test]
        fn remove_returns_none_when_absent() {
            let mut store = FieldStore::new();
            let field = store.insert(spec(5.0)).expect("valid");
            assert!(store.remove(field.id).is_some());
            assert!(store.remove(field.id).is_none());
        }

        #[test]
        fn snapshot_is_a_copy() {
            let mut store = FieldStore::new();
            let field = store.insert(spec(5.0)).expect("valid");
            let snapshot = store.snapshot();
            if let Some(live) = store.get_mut(field.id) {
                live.strength = 99.0;
            }
            assert_eq!(snapshot[0].strength, 1.0);
        }
    }
}
