fn main() {
    nippo_ui::start();
}
