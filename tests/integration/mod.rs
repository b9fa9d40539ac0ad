//! Scenarios that drive the autoplay resolver, the track-end continuation and the
//! control dispatcher through fake players, the way the node event hooks and buttons do.

mod autoplay;
mod track_end;
