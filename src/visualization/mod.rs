pub mod qtsim_vis2d;
