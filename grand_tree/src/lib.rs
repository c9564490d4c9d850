//! # grand_tree
//!
//! Gesture controller and software-rendered viewer for the
//! [`formation_core`] scene: a cloud of emerald particles, ornaments and
//! photo cards that assembles into a Christmas tree on a closed hand and
//! scatters on an open hand.
//!
//! ## Gesture → Action mapping
//!
//! | Gesture | Status text | Action |
//! |---|---|---|
//! | Open hand | `OPEN HAND - CHAOS UNLEASHED` | Scatter: progress damps toward 0 |
//! | Closed hand | `CLOSED HAND - TREE FORMED` | Assemble: progress damps toward 1 |
//! | No hand | `NO HAND DETECTED` | State holds |
//!
//! Hand position steers the camera while the tree is formed; otherwise the
//! camera orbits on its own.
//!
//! ## Cadence
//!
//! Rendering runs at the window's frame rate.  Classification runs on a
//! worker thread every 800 ms (configurable); a tick that comes due while a
//! request is still in flight is skipped.
//!
//! ## Feature flags
//!
//! * default, **Simulation**: keyboard + mouse in the viewer window.
//! * `remote`, **Vision API**: still frames classified over HTTP.
//!
//! ### Simulation keys
//!
//! | Key | Gesture |
//! |---|---|
//! | `O` | Open hand |
//! | `C` | Closed hand |
//! | `N` | No hand |
//! | mouse | Hand position |
//! | `Q` / `Esc` | Quit |

pub mod gesture;
pub mod classifier;
pub mod poller;
pub mod config;
pub mod error;
pub mod visualizer;
pub mod app;
