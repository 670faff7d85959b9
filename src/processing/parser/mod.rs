pub mod vavoo;
