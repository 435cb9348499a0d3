pub mod logo;
pub mod qr;
