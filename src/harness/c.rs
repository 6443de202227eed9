//! C driver
//!
//! C has no `Solution` type, so the driver calls free functions with the
//! usual signatures: `int* twoSum(int* nums, int numsSize, int target,
//! int* returnSize)` and `struct ListNode* reverseList(struct ListNode* head)`.

use super::kind::{OutputShape, ProblemKind, GENERIC_PLACEHOLDER};

const PREAMBLE: &str = r#"#include <stdio.h>
#include <stdlib.h>
#include <string.h>
#include <ctype.h>
#include <stdbool.h>

"#;

const LIST_NODE: &str = r#"struct ListNode {
    int val;
    struct ListNode *next;
};

"#;

const ARRAY_HELPERS: &str = r#"static char* readLine(void) {
    static char buffer[1 << 20];
    if (!fgets(buffer, sizeof(buffer), stdin)) {
        buffer[0] = '\0';
    }
    buffer[strcspn(buffer, "\r\n")] = '\0';
    return buffer;
}

static int* parseIntArray(const char* line, int* size) {
    int capacity = 16;
    int* values = malloc(sizeof(int) * capacity);
    *size = 0;

    const char* cursor = line;
    while (*cursor) {
        if (*cursor == '-' || isdigit((unsigned char)*cursor)) {
            char* end;
            long value = strtol(cursor, &end, 10);
            if (end == cursor) {
                cursor++;
                continue;
            }
            if (*size == capacity) {
                capacity *= 2;
                values = realloc(values, sizeof(int) * capacity);
            }
            values[(*size)++] = (int)value;
            cursor = end;
        } else {
            cursor++;
        }
    }
    return values;
}

static void printIntArray(const int* arr, int size) {
    printf("[");
    for (int i = 0; i < size; i++) {
        if (i > 0) printf(",");
        printf("%d", arr[i]);
    }
    printf("]\n");
}

"#;

const LIST_HELPERS: &str = r#"static struct ListNode* parseLinkedList(const char* line) {
    int size = 0;
    int* values = parseIntArray(line, &size);
    struct ListNode* head = NULL;
    struct ListNode** tail = &head;
    for (int i = 0; i < size; i++) {
        struct ListNode* node = malloc(sizeof(struct ListNode));
        node->val = values[i];
        node->next = NULL;
        *tail = node;
        tail = &node->next;
    }
    free(values);
    return head;
}

static void printLinkedList(struct ListNode* head) {
    printf("[");
    bool first = true;
    for (struct ListNode* current = head; current; current = current->next) {
        if (!first) printf(",");
        printf("%d", current->val);
        first = false;
    }
    printf("]\n");
}

"#;

pub fn wrap(source: &str, kind: ProblemKind) -> String {
    let descriptor = kind.descriptor();
    let mut program = String::from(PREAMBLE);

    if kind.uses_linked_list() {
        program.push_str(LIST_NODE);
    }

    program.push_str(source);
    program.push_str("\n\n");

    program.push_str(ARRAY_HELPERS);
    if kind.uses_linked_list() {
        program.push_str(LIST_HELPERS);
    }

    program.push_str("int main(void) {\n");

    match descriptor.output {
        OutputShape::IntArray => {
            program.push_str("    int numsSize = 0;\n");
            program.push_str("    int* nums = parseIntArray(readLine(), &numsSize);\n");
            program.push_str("    int target = atoi(readLine());\n");
            program.push_str("    int returnSize = 0;\n");
            program.push_str(&format!(
                "    int* result = {}(nums, numsSize, target, &returnSize);\n",
                descriptor.entry_method
            ));
            program.push_str("    printIntArray(result, returnSize);\n");
            program.push_str("    free(nums);\n");
        }
        OutputShape::LinkedList => {
            program.push_str("    struct ListNode* head = parseLinkedList(readLine());\n");
            program.push_str(&format!(
                "    struct ListNode* result = {}(head);\n",
                descriptor.entry_method
            ));
            program.push_str("    printLinkedList(result);\n");
        }
        OutputShape::Placeholder => {
            program.push_str("    readLine();\n");
            program.push_str(&format!("    printf(\"{}\\n\");\n", GENERIC_PLACEHOLDER));
        }
    }

    program.push_str("    return 0;\n");
    program.push_str("}\n");
    program
}
