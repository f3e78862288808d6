//! Interactive 3D d20 die roller: physics roll, top-face detection, and a
//! scripted result display, packaged as a Bevy plugin.

pub mod dice;
