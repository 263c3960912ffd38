fn main() {
    // ESP-IDF link arguments are only needed for the firmware image; host
    // builds (tests, simulation) skip them.
    #[cfg(feature = "espidf")]
    embuild::espidf::sysenv::output();
}
