mod cone_angles;

pub use cone_angles::ConeAngles;
