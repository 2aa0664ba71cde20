pub mod amdgpu;
pub mod discovery;
