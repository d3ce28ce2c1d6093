//! Pointer interaction with the 3D scene.
//!
//! The raycaster casts the cursor ray against `Interactable` boxes on each
//! render tick, feeds the nearest hit to the outline selection and turns
//! left clicks into `InteractableClicked` events. It is switched off while
//! page UI such as the card editor is open.

/// Ray versus oriented box intersection.
pub mod ray;

/// Raycaster resource, interaction toggling and picking systems.
pub mod raycaster;
